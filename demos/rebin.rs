use std::{env, io};

use xsecbin::bin_series;
use xsecbin::config::BinningConfig;
use xsecbin::text::{columns_from_file, write_binned_table, TableMetadata};

fn main() -> io::Result<()> {
    let path = env::args().nth(1).unwrap();
    let target: f64 = env::args().nth(2).unwrap_or_else(|| "100".to_string()).parse().unwrap();

    let columns = columns_from_file(&path).unwrap();

    let binned = bin_series(&columns[0], &columns[1], &BinningConfig::resolution(target)).unwrap();

    let metadata = TableMetadata {
        from_file: path,
        binning: binned.description.clone(),
        ..Default::default()
    };
    write_binned_table(&mut io::stdout().lock(), &metadata, &binned.location, &binned.value)?;
    Ok(())
}
