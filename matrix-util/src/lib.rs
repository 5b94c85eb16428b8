pub mod common_io;
pub mod count_table;
pub mod dmatrix_io;
