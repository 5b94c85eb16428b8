use crate::common_io::{read_lines_of_types, write_lines};
pub use nalgebra::{DMatrix, DVector};

use std::fmt::Display;
use std::str::FromStr;

/// Read and write dense matrices as delimited text
pub trait IoOps {
    type Mat;

    fn read_file_delim(file: &str, delim: &str) -> anyhow::Result<Self::Mat>;

    fn from_tsv(tsv_file: &str) -> anyhow::Result<Self::Mat> {
        Self::read_file_delim(tsv_file, "\t")
    }

    fn write_file_delim(&self, file: &str, delim: &str) -> anyhow::Result<()>;

    fn to_tsv(&self, tsv_file: &str) -> anyhow::Result<()> {
        self.write_file_delim(tsv_file, "\t")
    }
}

impl<T> IoOps for DMatrix<T>
where
    T: nalgebra::Scalar + FromStr + Display + Copy,
    <T as FromStr>::Err: Display,
{
    type Mat = Self;

    fn read_file_delim(file: &str, delim: &str) -> anyhow::Result<Self::Mat> {
        let data = read_lines_of_types::<T>(file, delim)?;

        if data.is_empty() {
            return Err(anyhow::anyhow!("No data in file"));
        }

        let ncols = data[0].len();
        let nrows = data.len();
        anyhow::ensure!(
            data.iter().all(|x| x.len() == ncols),
            "ragged rows in {}",
            file
        );
        let data = data.into_iter().flatten().collect::<Vec<_>>();

        Ok(DMatrix::<T>::from_row_iterator(nrows, ncols, data))
    }

    fn write_file_delim(&self, file: &str, delim: &str) -> anyhow::Result<()> {
        let lines = self
            .row_iter()
            .map(|row| {
                row.iter()
                    .map(|x| format!("{}", *x))
                    .collect::<Vec<String>>()
                    .join(delim)
                    .into_boxed_str()
            })
            .collect::<Vec<_>>();
        write_lines(&lines, file)?;
        Ok(())
    }
}
