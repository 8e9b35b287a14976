use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

/// One `sort` token: a field name with an optional leading `-` for descending.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortField {
    pub field: String,
    pub dir: SortDir,
}

impl SortField {
    pub fn parse(token: &str) -> Self {
        let token = token.trim();
        match token.strip_prefix('-') {
            Some(field) => Self {
                field: field.to_string(),
                dir: SortDir::Desc,
            },
            None => Self {
                field: token.to_string(),
                dir: SortDir::Asc,
            },
        }
    }

    pub fn is_descending(&self) -> bool {
        self.dir == SortDir::Desc
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.dir {
            SortDir::Asc => write!(f, "{}", self.field),
            SortDir::Desc => write!(f, "-{}", self.field),
        }
    }
}

/// Split a `sort` value into raw tokens. Order and duplicates are kept.
pub fn parse_sort(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
