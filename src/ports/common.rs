#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PaginationResult<T> {
    pub values: Vec<T>,
    pub has_next: bool,
}
