use std::io::{BufRead, Write, stdin, stdout};
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use dotenv::dotenv;
use stockscope_analysis::indicators::{self, Indicators};
use stockscope_analysis::series;
use stockscope_chart::figure::{self, FigureSpec};
use stockscope_chart::RenderedChart;

mod data_fetcher;
use data_fetcher::FetchError;

const DEFAULT_SYMBOL: &str = "TSLA";
const DEFAULT_START_YEAR: &str = "2020";

#[derive(Parser, Debug)]
#[command(author, version, about = "Weekly stock trend analyzer", long_about = None)]
struct Args {
    /// Stock symbol, e.g. TSLA for Tesla, MSFT for Microsoft
    symbol: Option<String>,

    /// Starting year of the analysis window, e.g. 2020
    start_year: Option<String>,
}

#[derive(thiserror::Error, Debug)]
enum PipelineError {
    #[error("{0}")]
    Fetch(#[from] FetchError),
    #[error("Invalid starting year '{0}': expected a calendar year such as 2020")]
    InvalidYear(String),
    #[error("{0}")]
    Series(#[from] series::SeriesError),
    #[error("Failed to calculate indicators: {0}")]
    Indicators(#[from] polars::prelude::PolarsError),
    #[error("{0}")]
    Chart(#[from] stockscope_chart::ChartError),
    #[error("Console I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    // 1 invalid symbol, 2 rate limited, 3 bad response, 4 bad analysis window.
    fn exit_code(&self) -> u8 {
        match self {
            PipelineError::Fetch(FetchError::InvalidSymbol(_)) => 1,
            PipelineError::Fetch(FetchError::RateLimited(_)) => 2,
            PipelineError::Fetch(FetchError::MalformedPayload(_))
            | PipelineError::Fetch(FetchError::Http(_)) => 3,
            PipelineError::InvalidYear(_) | PipelineError::Series(_) => 4,
            PipelineError::Indicators(_) | PipelineError::Chart(_) | PipelineError::Io(_) => 1,
        }
    }
}

fn report(err: &PipelineError) {
    match err {
        PipelineError::Fetch(FetchError::InvalidSymbol(message)) => {
            eprintln!("Error: {message}");
            eprintln!("Stock SYMBOL INVALID");
        }
        PipelineError::Fetch(FetchError::RateLimited(note)) => {
            eprintln!("Note: {note}");
            eprintln!("Aborting: the API rate limit was reached, try again later.");
        }
        _ => eprintln!("Error: {err}"),
    }
}

/// Positional arguments default as a pair: a symbol without a year (or the
/// other way around) falls back to both defaults, with a console notice.
fn resolve_inputs(symbol: Option<String>, start_year: Option<String>) -> (String, String) {
    match (symbol, start_year) {
        (Some(symbol), Some(start_year)) => (symbol, start_year),
        _ => {
            println!(
                "Stock symbol or starting year not provided. \
                 Using TESLA as default: {DEFAULT_SYMBOL} {DEFAULT_START_YEAR}"
            );
            (DEFAULT_SYMBOL.to_string(), DEFAULT_START_YEAR.to_string())
        }
    }
}

async fn run(symbol: &str, start_year_raw: &str) -> Result<(), PipelineError> {
    let start_year: i32 = start_year_raw
        .trim()
        .parse()
        .map_err(|_| PipelineError::InvalidYear(start_year_raw.to_string()))?;

    let api_key = std::env::var("ALPHAVANTAGE_API_KEY")
        .unwrap_or_else(|_| data_fetcher::DEFAULT_API_KEY.to_string());

    let mut points = data_fetcher::fetch_weekly_series(symbol, &api_key).await?;

    series::sort_by_date(&mut points);
    let filtered = series::filter_from_year(points, start_year)?;

    println!();
    println!("Stock data fetched successfully.");
    println!("Plotting graphs...");

    let df = Indicators::new(&filtered).calculate()?;
    let short_ma = indicators::column_values(&df, "ma4")?;
    let long_ma = indicators::column_values(&df, "ma12")?;

    let chart = figure::render(&FigureSpec {
        points: &filtered,
        short_ma: &short_ma,
        long_ma: &long_ma,
        symbol,
        start_year,
    })?;

    let image_path = format!("{symbol}_stock_Analysis.png");
    let stdin = stdin();
    export_prompt(&chart, Path::new(&image_path), &mut stdin.lock(), &mut stdout())
}

/// Bounded y/n loop over the input stream; end-of-input means discard.
fn export_prompt<R: BufRead, W: Write>(
    chart: &RenderedChart,
    image_path: &Path,
    input: &mut R,
    out: &mut W,
) -> Result<(), PipelineError> {
    loop {
        write!(
            out,
            "Press [Y] to save plot image or [N] to discard this stock data: "
        )?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(out, "Stock data discarded.")?;
            return Ok(());
        }

        match line.trim().to_lowercase().as_str() {
            "y" => {
                chart.save_png(image_path)?;
                writeln!(out, "Image saved as {}", image_path.display())?;
                return Ok(());
            }
            "n" => {
                writeln!(out, "Stock data discarded.")?;
                return Ok(());
            }
            _ => writeln!(out, "Invalid input. Please enter 'Y' or 'N'.")?,
        }
    }
}

fn main() -> ExitCode {
    dotenv().ok();

    let args = Args::parse();
    let (symbol, start_year) = resolve_inputs(args.symbol, args.start_year);

    let rt = tokio::runtime::Runtime::new().expect("Failed to build tokio runtime");

    match rt.block_on(run(&symbol, &start_year)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::from(err.exit_code())
        }
    }
}
