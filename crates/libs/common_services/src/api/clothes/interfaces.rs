use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListClothesParams {
    /// `male`, `female` or `neutral`. Neutral garments match every gender.
    pub gender: Option<String>,
    /// Body height in cm, e.g. `170` or `170cm`.
    pub height: Option<String>,
}
