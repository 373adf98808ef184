use thiserror::Error;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("node is not an element")]
    NotAnElement,
    #[error("node already has a parent")]
    AlreadyAttached,
    #[error("node cannot be its own ancestor")]
    CycleDetected,
}
