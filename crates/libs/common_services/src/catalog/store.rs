use crate::catalog::CatalogError;
use app_state::{CatalogSettings, to_posix_string};
use common_types::{GarmentItem, ImageAsset};
use reqwest::Client;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;
use tracing::{debug, info, warn};

const IMAGE_ROUTE: &str = "/images/";
const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Read-only garment catalog, loaded once from a JSON document.
#[derive(Clone)]
pub struct JsonCatalog {
    inner: Arc<CatalogInner>,
}

struct CatalogInner {
    items: Vec<GarmentItem>,
    by_id: HashMap<String, usize>,
    image_folder: PathBuf,
    http: Client,
}

impl JsonCatalog {
    /// Load `settings.data_file`. A missing file is an empty catalog.
    pub async fn load(settings: &CatalogSettings) -> Result<Self, CatalogError> {
        let path = &settings.data_file;
        let items = match fs::read(path).await {
            Ok(bytes) => parse_catalog(&bytes).map_err(|source| CatalogError::Parse {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Catalog {} not found, starting empty", path.display());
                vec![]
            }
            Err(source) => {
                return Err(CatalogError::Io {
                    path: path.clone(),
                    source,
                });
            }
        };
        let catalog = Self::with_fetch_timeout(
            items,
            settings.image_folder.clone(),
            Duration::from_secs(settings.image_fetch_timeout_secs),
        )?;
        info!("Loaded {} garments from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn from_items(items: Vec<GarmentItem>, image_folder: PathBuf) -> Result<Self, CatalogError> {
        Self::with_fetch_timeout(items, image_folder, DEFAULT_FETCH_TIMEOUT)
    }

    /// Ids are unique afterwards. A repeated id keeps the position of its first
    /// record and the contents of its last.
    pub fn with_fetch_timeout(
        items: Vec<GarmentItem>,
        image_folder: PathBuf,
        fetch_timeout: Duration,
    ) -> Result<Self, CatalogError> {
        let mut by_id = HashMap::with_capacity(items.len());
        let mut unique: Vec<GarmentItem> = Vec::with_capacity(items.len());
        for item in items {
            if let Some(&index) = by_id.get(&item.id) {
                warn!("Duplicate garment id {}, the last record wins", item.id);
                unique[index] = item;
            } else {
                by_id.insert(item.id.clone(), unique.len());
                unique.push(item);
            }
        }
        let http = Client::builder()
            .connect_timeout(fetch_timeout)
            .timeout(fetch_timeout)
            .build()?;
        Ok(Self {
            inner: Arc::new(CatalogInner {
                items: unique,
                by_id,
                image_folder,
                http,
            }),
        })
    }

    #[must_use]
    pub fn items(&self) -> &[GarmentItem] {
        &self.inner.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.items.is_empty()
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<&GarmentItem> {
        self.inner
            .by_id
            .get(id)
            .and_then(|&index| self.inner.items.get(index))
    }

    /// `item` as clients should see it: `image_url` always filled in.
    #[must_use]
    pub fn public_item(item: &GarmentItem) -> GarmentItem {
        let mut item = item.clone();
        item.image_url = Some(public_image_url(&item));
        item
    }

    /// Decoded catalog image of `item`.
    pub async fn load_image(&self, item: &GarmentItem) -> Result<ImageAsset, CatalogError> {
        let bytes = match item.image_url.as_deref().map(str::trim) {
            Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
                debug!("Fetching garment image {url}");
                let response = self.inner.http.get(url).send().await?.error_for_status()?;
                response.bytes().await?.to_vec()
            }
            Some(url) if !url.is_empty() => {
                let relative = url.strip_prefix(IMAGE_ROUTE).unwrap_or(url);
                self.read_local(relative).await?
            }
            _ => self.read_local(&format!("{}.jpg", item.id)).await?,
        };
        Ok(ImageAsset::decode(&bytes)?)
    }

    async fn read_local(&self, relative: &str) -> Result<Vec<u8>, CatalogError> {
        let path = resolve_local(&self.inner.image_folder, relative)
            .ok_or_else(|| CatalogError::InvalidImagePath(relative.to_owned()))?;
        fs::read(&path)
            .await
            .map_err(|source| CatalogError::ImageIo { path, source })
    }
}

fn parse_catalog(bytes: &[u8]) -> Result<Vec<GarmentItem>, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// `relative` joined onto `folder`, refusing anything that could climb out of it.
fn resolve_local(folder: &Path, relative: &str) -> Option<PathBuf> {
    let relative = Path::new(relative.trim_start_matches(['/', '\\']));
    relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
        .then(|| folder.join(relative))
}

fn public_image_url(item: &GarmentItem) -> String {
    match item.image_url.as_deref().map(str::trim) {
        Some(url) if url.starts_with("http://") || url.starts_with("https://") => url.to_owned(),
        Some(url) if !url.is_empty() => {
            let url = to_posix_string(Path::new(url));
            if url.starts_with(IMAGE_ROUTE) {
                url
            } else {
                format!("{IMAGE_ROUTE}{}", url.trim_start_matches('/'))
            }
        }
        _ => format!("{IMAGE_ROUTE}{}.jpg", item.id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common_types::{Category, GarmentCategory, Gender};
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    const CATALOG: &str = r#"[
        {"id": "1", "name": "白色T恤", "category": "Upper-body", "gender": "女性",
         "height_range": "150-165cm", "style": "休闲"},
        {"id": "2", "name": "Pleated skirt", "category": "midi-skirt", "gender": "female",
         "height_range": {"min_cm": 155, "max_cm": 175}, "style_tags": ["formal"],
         "image_url": "/images/skirt.png"},
        {"id": "3", "name": "Jumpsuit", "category": "jumpsuit", "gender": "unisex",
         "height_range": "160~190"}
    ]"#;

    #[test]
    fn parses_legacy_and_current_records() {
        let items = parse_catalog(CATALOG.as_bytes()).expect("valid catalog");
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].category, Category::Known(GarmentCategory::UpperBody));
        assert_eq!(items[0].gender_tag, Gender::Female);
        assert_eq!(items[0].style_tags, ["休闲"]);
        assert!(items[1].height_range.contains(175.0));
        assert_eq!(items[2].category, Category::Unknown("jumpsuit".to_owned()));
        assert_eq!(items[2].gender_tag, Gender::Neutral);
    }

    #[test]
    fn finds_by_id() {
        let items = parse_catalog(CATALOG.as_bytes()).expect("valid catalog");
        let catalog = JsonCatalog::from_items(items, PathBuf::from("model")).expect("client");
        assert_eq!(catalog.find("2").map(|i| i.name.as_str()), Some("Pleated skirt"));
        assert!(catalog.find("99").is_none());
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn public_urls_point_at_image_route() {
        let items = parse_catalog(CATALOG.as_bytes()).expect("valid catalog");
        assert_eq!(public_image_url(&items[0]), "/images/1.jpg");
        assert_eq!(public_image_url(&items[1]), "/images/skirt.png");

        let mut remote = items[0].clone();
        remote.image_url = Some("https://cdn.example.com/a.jpg".to_owned());
        assert_eq!(public_image_url(&remote), "https://cdn.example.com/a.jpg");
    }

    #[test]
    fn local_paths_stay_inside_folder() {
        let folder = Path::new("/srv/model");
        assert_eq!(
            resolve_local(folder, "/shirts/1.jpg"),
            Some(PathBuf::from("/srv/model/shirts/1.jpg"))
        );
        assert_eq!(resolve_local(folder, "../secrets.env"), None);
    }

    #[tokio::test]
    async fn loads_images_from_folder() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut png = Vec::new();
        RgbImage::from_pixel(4, 6, Rgb([1, 2, 3]))
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .expect("encode");
        std::fs::write(dir.path().join("1.jpg"), &png).expect("write");
        std::fs::write(dir.path().join("skirt.png"), &png).expect("write");

        let items = parse_catalog(CATALOG.as_bytes()).expect("valid catalog");
        let catalog = JsonCatalog::from_items(items, dir.path().to_path_buf()).expect("client");

        let by_id = catalog.load_image(&catalog.items()[0]).await.expect("found");
        assert_eq!(by_id.dimensions(), (4, 6));
        let by_url = catalog.load_image(&catalog.items()[1]).await.expect("found");
        assert_eq!(by_url.dimensions(), (4, 6));
        assert!(matches!(
            catalog.load_image(&catalog.items()[2]).await,
            Err(CatalogError::ImageIo { .. })
        ));
    }

    #[tokio::test]
    async fn missing_catalog_file_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = CatalogSettings {
            data_file: dir.path().join("clothes.json"),
            image_folder: dir.path().to_path_buf(),
            image_fetch_timeout_secs: 30,
        };
        let catalog = JsonCatalog::load(&settings).await.expect("loads");
        assert!(catalog.is_empty());
    }

    #[test]
    fn duplicate_ids_are_collapsed() {
        let mut items = parse_catalog(CATALOG.as_bytes()).expect("valid catalog");
        let mut newer = items[0].clone();
        newer.name = "Updated tee".to_owned();
        items.push(newer);

        let catalog = JsonCatalog::from_items(items, PathBuf::from("model")).expect("client");
        let ids: Vec<_> = catalog.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3"]);
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.find("1").map(|i| i.name.as_str()), Some("Updated tee"));
        assert_eq!(catalog.items()[0].name, "Updated tee");
    }

    #[tokio::test]
    async fn stalled_image_host_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        // Accepts connections and never answers.
        tokio::spawn(async move {
            let mut open = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                open.push(stream);
            }
        });

        let mut items = parse_catalog(CATALOG.as_bytes()).expect("valid catalog");
        items[0].image_url = Some(format!("http://{addr}/a.jpg"));
        let catalog = JsonCatalog::with_fetch_timeout(
            items,
            PathBuf::from("model"),
            Duration::from_millis(200),
        )
        .expect("client");

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            catalog.load_image(&catalog.items()[0]),
        )
        .await
        .expect("client gives up first");
        match result {
            Err(CatalogError::Fetch(e)) => assert!(e.is_timeout(), "unexpected error {e}"),
            Err(other) => panic!("unexpected error {other}"),
            Ok(_) => panic!("stalled host produced an image"),
        }
    }
}
