//! Create and manipulate a row-based [`Table`].

use crate::utils;
use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use itertools::Itertools;
use std::collections::HashSet;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::path::{Path, PathBuf};

#[cfg(test)]
mod tests;

/// A row-based table of generic data.
///
/// # Examples
///
/// ```
/// use strepcore::Table;
///
/// let mut table = Table::new();
/// table.headers = vec!["1", "2", "3"];
/// table.add_row(vec!["A", "B", "C"])?;
/// assert_eq!(table.get("2", 0)?, &"B");
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
///
/// | 1 | 2 | 3 |
/// |---|---|---|
/// | A | B | C |
///
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Table<T> {
    /// Names of the table columns.
    pub headers: Vec<T>,
    /// Rows of table values.
    pub rows: Vec<Vec<T>>,
    /// Optional file path for where the table was read from.
    pub path: Option<PathBuf>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Table<T> {
    /// Create a new table with empty headers and rows.
    pub fn new() -> Self {
        Table { headers: Vec::new(), rows: Vec::new(), path: None }
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Methods for when the table data can be compared and displayed.
impl<T> Table<T>
where
    T: Clone + Debug + Display + PartialEq,
{
    /// Add a new row to the table.
    ///
    /// The row must have one value per header.
    ///
    /// ```
    /// use strepcore::Table;
    ///
    /// let mut table = Table::new();
    /// table.headers = vec!["1", "2", "3"];
    /// table.add_row(vec!["A", "B", "C"])?;
    /// assert!(table.add_row(vec!["D", "E"]).is_err());
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn add_row<I>(&mut self, row: I) -> Result<(), Report>
    where
        I: IntoIterator<Item = T>,
    {
        let row = row.into_iter().collect_vec();
        let (new, ex) = (row.len(), self.headers.len());
        if new != ex {
            return Err(eyre!("New row size ({new}) does not match the table headers ({ex})."));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Add a new column to the table.
    ///
    /// ```
    /// use strepcore::Table;
    ///
    /// let mut table = Table::new();
    /// table.headers = vec!["1", "2", "3"];
    /// table.add_row(vec!["A", "B", "C"])?;
    /// table.add_column("4", vec!["D"])?;
    /// assert_eq!(table.get_column("4")?, [&"D"]);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    ///
    /// | 1 | 2 | 3 | 4 |
    /// |---|---|---|---|
    /// | A | B | C | D |
    ///
    pub fn add_column<I>(&mut self, header: T, column: I) -> Result<(), Report>
    where
        I: IntoIterator<Item = T>,
    {
        let column = column.into_iter().collect_vec();
        let (new, ex) = (column.len(), self.rows.len());
        if ex != new {
            return Err(eyre!("New column size ({new}) does not match existing table ({ex})."));
        }

        self.headers.push(header);
        column.into_iter().enumerate().for_each(|(i, val)| {
            self.rows[i].push(val);
        });
        Ok(())
    }

    /// Get table value at a particular column and row index.
    pub fn get(&self, header: &str, row: usize) -> Result<&T, Report> {
        let header_i = self.get_header_index(header)?;
        let row = self.get_row(row)?;
        Ok(&row[header_i])
    }

    /// Set the table value at a particular column and row index.
    pub fn set(&mut self, header: &str, row: usize, value: T) -> Result<(), Report> {
        let header_i = self.get_header_index(header)?;
        if row >= self.rows.len() {
            return Err(eyre!("Row ({row}) does not exist in the table."));
        }
        self.rows[row][header_i] = value;
        Ok(())
    }

    /// Return a vector of table values in a column.
    pub fn get_column(&self, header: &str) -> Result<Vec<&T>, Report> {
        let header_i = self.get_header_index(header)?;
        let column = self.rows.iter().map(|row| &row[header_i]).collect();
        Ok(column)
    }

    /// Return a slice of table values in a row.
    pub fn get_row(&self, i: usize) -> Result<&[T], Report> {
        if i >= self.rows.len() {
            Err(eyre!("Row ({i}) does not exist in the table."))
        } else {
            Ok(&self.rows[i])
        }
    }

    /// Get the column index (0-based) corresponding to the header.
    ///
    /// ```
    /// use strepcore::Table;
    ///
    /// let mut table = Table::new();
    /// table.headers = vec!["1", "2", "3"];
    ///
    /// assert_eq!(table.get_header_index("3")?, 2);
    /// assert!(table.get_header_index("4").is_err());
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn get_header_index(&self, header: &str) -> Result<usize, Report> {
        self.headers.iter().position(|h| h.to_string() == header).ok_or_else(|| {
            eyre!("Column '{header}' was not found in table: {:?}.", self.path)
        })
    }

    /// Returns true if the table has a column with this header.
    pub fn has_header(&self, header: &str) -> bool {
        self.get_header_index(header).is_ok()
    }

    /// Convert table to a [`tabled::Table`] for printing on the console.
    pub fn to_tabled(&self) -> tabled::Table {
        let mut builder = tabled::builder::Builder::default();
        builder.push_record(self.headers.iter().map(|h| h.to_string()));
        self.rows.iter().for_each(|row| builder.push_record(row.iter().map(|v| v.to_string())));
        builder.build()
    }

    /// Write table to a delimited file.
    ///
    /// The delimiter is looked up from the file extension (`.tsv`, `.txt`, `.csv`).
    pub fn write<P>(&self, path: &P) -> Result<(), Report>
    where
        P: AsRef<Path> + Debug,
    {
        let delim = utils::get_delimiter(path)?;
        utils::create_parent_dir(path)?;
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delim as u8)
            .from_path(path)
            .wrap_err_with(|| eyre!("Unable to create file: {path:?}"))?;

        writer
            .write_record(self.headers.iter().map(|h| h.to_string()))
            .wrap_err_with(|| eyre!("Unable to write table headers: {path:?}"))?;

        self.rows.iter().try_for_each(|row| {
            writer
                .write_record(row.iter().map(|v| v.to_string()))
                .wrap_err_with(|| eyre!("Unable to write table row {row:?}: {path:?}"))
        })?;

        writer.flush().wrap_err_with(|| eyre!("Unable to flush table: {path:?}"))?;
        Ok(())
    }
}

/// Methods for when table rows can be hashed.
impl<T> Table<T>
where
    T: Clone + Eq + Hash,
{
    /// Returns a copy of the table with exact duplicate rows removed, keeping first occurrences.
    ///
    /// ```
    /// use strepcore::Table;
    ///
    /// let mut table = Table::new();
    /// table.headers = vec!["1", "2"];
    /// table.rows = vec![vec!["A", "B"], vec!["C", "D"], vec!["A", "B"]];
    /// assert_eq!(table.unique().rows, [["A", "B"], ["C", "D"]]);
    /// ```
    pub fn unique(&self) -> Table<T> {
        let mut seen = HashSet::new();
        let rows = self.rows.iter().filter(|row| seen.insert(*row)).cloned().collect_vec();
        Table { headers: self.headers.clone(), rows, path: self.path.clone() }
    }
}

/// Methods for tables of owned strings, as read from files.
impl Table<String> {
    /// Read a delimited file into a [`Table`].
    ///
    /// The first line holds the headers, the delimiter is looked up from the file extension.
    /// Short rows are padded with empty values, long rows are truncated to the headers.
    ///
    /// ```
    /// use strepcore::Table;
    /// use std::io::Write;
    ///
    /// let mut file = tempfile::Builder::new().suffix(".tsv").tempfile()?;
    /// writeln!(file, "1\t2\t3\nA\tB\tC\nD")?;
    /// let table = Table::read(file.path())?;
    /// assert_eq!(table.rows, [["A", "B", "C"], ["D", "", ""]]);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn read<P>(path: &P) -> Result<Table<String>, Report>
    where
        P: AsRef<Path> + Debug + ?Sized,
    {
        let path = path.as_ref();
        let delim = utils::get_delimiter(&path)?;
        utils::check_exists(&path)?;

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delim as u8)
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .wrap_err_with(|| eyre!("Failed to read file: {path:?}"))?;

        let mut table = Table::new();
        for (i, record) in reader.records().enumerate() {
            let record = record.wrap_err_with(|| eyre!("Failed to parse line {i} of: {path:?}"))?;
            let mut row = record.iter().map(String::from).collect_vec();
            // if headers are empty, this is the first line, write headers
            if i == 0 {
                table.headers = row;
                continue;
            }
            // skip blank lines
            if row.iter().all(|v| v.is_empty()) {
                continue;
            }
            row.resize(table.headers.len(), String::new());
            table.rows.push(row);
        }

        table.path = Some(path.to_path_buf());
        Ok(table)
    }

    /// Parse a column as numbers, naming the offending value on failure.
    ///
    /// ```
    /// use strepcore::Table;
    ///
    /// let mut table = Table::new();
    /// table.headers = vec!["species".to_string(), "count".to_string()];
    /// table.rows = vec![vec!["equi".to_string(), " 398".to_string()]];
    /// assert_eq!(table.get_numeric_column("count")?, [398.0]);
    /// assert!(table.get_numeric_column("species").is_err());
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn get_numeric_column(&self, header: &str) -> Result<Vec<f64>, Report> {
        self.get_column(header)?
            .into_iter()
            .map(|value| {
                value.trim().parse::<f64>().wrap_err_with(|| {
                    eyre!("Column '{header}' has a non-numeric value: {value:?} in {:?}", self.path)
                })
            })
            .collect()
    }

    /// Returns a new table with only these columns, in this order.
    ///
    /// Columns missing from the table are filled with empty values.
    pub fn select(&self, headers: &[&str]) -> Table<String> {
        let indices = headers.iter().map(|h| self.get_header_index(h).ok()).collect_vec();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                indices
                    .iter()
                    .map(|i| i.map(|i| row[i].clone()).unwrap_or_default())
                    .collect_vec()
            })
            .collect_vec();
        Table { headers: headers.iter().map(|h| h.to_string()).collect(), rows, path: None }
    }
}
