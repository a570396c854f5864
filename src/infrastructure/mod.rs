pub mod change_stream;
pub mod postgres;
