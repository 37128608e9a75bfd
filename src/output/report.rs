use crate::mapping::Product;
use crate::pagination::{FetchOutcome, FetchStats};
use std::io::{self, Write};

/// Writes the fetched products as a numbered table
///
/// # Arguments
///
/// * `out` - Destination writer
/// * `products` - Products in fetch order
pub fn write_products<W: Write>(out: &mut W, products: &[Product]) -> io::Result<()> {
    writeln!(out, "--- Fetched Products ({}) ---", products.len())?;
    for (i, product) in products.iter().enumerate() {
        writeln!(
            out,
            "{:>4}  {:<36}  {:<40}  {}",
            i + 1,
            product.id,
            product.title,
            product.updated_at
        )?;
    }
    Ok(())
}

/// Writes the end-of-run summary report
pub fn write_summary<W: Write>(out: &mut W, stats: &FetchStats) -> io::Result<()> {
    writeln!(out, "=== Summary Report ===")?;
    writeln!(out, "Total fetched:       {}", stats.total_fetched)?;
    writeln!(out, "Total requests:      {}", stats.total_requests)?;
    writeln!(out, "Total retries:       {}", stats.total_retries)?;
    writeln!(out, "Total sleep (s):     {:.2}", stats.total_sleep_seconds)?;
    writeln!(out, "Avg query cost:      {:.2}", stats.avg_query_cost)?;
    writeln!(out, "======================")?;
    Ok(())
}

/// Prints the product table (optional) and the summary report to stdout
pub fn print_outcome(outcome: &FetchOutcome, list_products: bool) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if list_products {
        writeln!(out)?;
        write_products(&mut out, &outcome.records)?;
    }

    writeln!(out)?;
    write_summary(&mut out, &outcome.stats)?;

    if outcome.is_partial() {
        writeln!(out, "Run stopped early: {}", outcome.phase)?;
    }

    Ok(())
}
