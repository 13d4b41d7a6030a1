/// Aggregated view of marking progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub marked: usize,
    pub remaining: usize,
    /// Index of the first question without a mark, if any — the question a
    /// caller should jump to when submission is blocked.
    pub first_unmarked: Option<usize>,
    pub is_complete: bool,
}
