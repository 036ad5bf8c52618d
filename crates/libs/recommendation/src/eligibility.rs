use common_types::{GarmentItem, Gender, UserProfile};
use std::cmp::Ordering;

/// Whether `item` fits someone `height_cm` tall who shops for `gender`.
#[must_use]
pub fn fits(item: &GarmentItem, height_cm: f32, gender: Gender) -> bool {
    item.height_range.contains(height_cm) && gender.accepts(item.gender_tag)
}

#[must_use]
pub fn is_eligible(item: &GarmentItem, profile: &UserProfile) -> bool {
    fits(item, profile.height_cm, profile.gender_preference)
}

/// Catalog listing filter. Missing criteria do not filter.
pub fn filter_catalog<'a>(
    catalog: &'a [GarmentItem],
    height_cm: Option<f32>,
    gender: Option<Gender>,
) -> impl Iterator<Item = &'a GarmentItem> {
    catalog.iter().filter(move |item| {
        height_cm.is_none_or(|h| item.height_range.contains(h))
            && gender.is_none_or(|g| g.accepts(item.gender_tag))
    })
}

/// Catalog id order: numeric ids by value ("2" before "10"), everything else lexically.
#[must_use]
pub fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common_types::{GarmentCategory, HeightRange};

    fn item(id: &str, gender: Gender, min: f32, max: f32) -> GarmentItem {
        GarmentItem {
            id: id.to_owned(),
            name: format!("item {id}"),
            category: GarmentCategory::UpperBody.into(),
            gender_tag: gender,
            height_range: HeightRange::new(min, max).expect("ordered"),
            style_tags: vec![],
            image_url: None,
        }
    }

    #[test]
    fn height_bounds_are_inclusive() {
        let shirt = item("1", Gender::Female, 150.0, 165.0);
        assert!(fits(&shirt, 150.0, Gender::Female));
        assert!(fits(&shirt, 165.0, Gender::Female));
        assert!(!fits(&shirt, 165.5, Gender::Female));
    }

    #[test]
    fn neutral_matches_everyone() {
        let unisex = item("1", Gender::Neutral, 150.0, 190.0);
        let mens = item("2", Gender::Male, 150.0, 190.0);
        assert!(fits(&unisex, 170.0, Gender::Male));
        assert!(fits(&unisex, 170.0, Gender::Female));
        assert!(fits(&mens, 170.0, Gender::Neutral));
        assert!(!fits(&mens, 170.0, Gender::Female));
    }

    #[test]
    fn catalog_filter_ignores_missing_criteria() {
        let catalog = vec![
            item("1", Gender::Female, 150.0, 165.0),
            item("2", Gender::Male, 170.0, 190.0),
        ];
        assert_eq!(filter_catalog(&catalog, None, None).count(), 2);
        let tall: Vec<_> = filter_catalog(&catalog, Some(180.0), None)
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(tall, ["2"]);
        assert_eq!(filter_catalog(&catalog, Some(180.0), Some(Gender::Female)).count(), 0);
    }

    #[test]
    fn numeric_ids_sort_by_value() {
        let mut ids = vec!["10", "2", "b", "1", "a"];
        ids.sort_by(|a, b| compare_ids(a, b));
        assert_eq!(ids, ["1", "2", "10", "a", "b"]);
    }
}
