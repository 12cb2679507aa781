use serde::Serialize;

/// Number of positional columns in a dataset row
pub const COLUMN_COUNT: usize = 8;

/// One normalized dataset row
///
/// Every field is a display string. Numeric columns are passed through as the
/// dataset spells them and `age` is derived from the birthdate column.
/// Field order is the JSON field order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub name: String,
    pub image: String,
    pub height: String,
    pub age: String,
    pub bust: String,
    pub cup: String,
    /// Waist measurement. The wire name is `west`.
    #[serde(rename = "west")]
    pub waist: String,
    pub hip: String,
}
