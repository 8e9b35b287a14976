use chrono::NaiveDate;

/// A book in the catalogue. Related objects are referenced by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub pages: u32,
    pub published_on: Option<NaiveDate>,
    pub author_ids: Vec<String>,
    pub publisher_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publisher {
    pub id: String,
    pub name: String,
    pub representative_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Representative {
    pub id: String,
    pub name: String,
    pub email: String,
}
