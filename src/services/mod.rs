pub mod storage;
pub mod trip;
