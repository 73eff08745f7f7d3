use std::{
    io,
    path::PathBuf,
};

use color_eyre::eyre::bail;
use reqwest::Client;
use structopt::{
    clap::AppSettings,
    StructOpt,
};
use url::Url;

use crate::{
    download::search_and_download,
    filter::Filters,
    progress::TerminalProgress,
    search::{
        Collection,
        SpatialTarget,
        DEFAULT_HOST,
    },
    Error,
    DEFAULT_USER_AGENT,
};

/// Search the PEPS Sentinel catalog and download the matching products
#[derive(Debug, StructOpt)]
#[structopt(setting = AppSettings::ArgRequiredElseHelp)]
pub struct Args {
    #[structopt(flatten)]
    pub global_args: GlobalArgs,

    #[structopt(flatten)]
    pub search_args: SearchArgs,

    #[structopt(subcommand)]
    pub target: SpatialTarget,
}

impl Args {
    pub async fn run(self) -> Result<(), Error> {
        let globals = self.global_args.build()?;
        let config = self.search_args.build(self.target)?;

        let mut progress = TerminalProgress::new()?;
        search_and_download(&globals.client, &config, &mut io::stdout(), &mut progress).await?;

        Ok(())
    }
}

#[derive(Debug, StructOpt)]
pub struct GlobalArgs {
    #[structopt(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,
}

impl GlobalArgs {
    fn build(self) -> Result<Globals, Error> {
        let client = Client::builder().user_agent(self.user_agent).build()?;
        Ok(Globals { client })
    }
}

pub struct Globals {
    pub client: Client,
}

#[derive(Debug, StructOpt)]
pub struct SearchArgs {
    /// Sentinel collection
    #[structopt(
        short,
        long,
        default_value = "S2",
        possible_values = Collection::VARIANTS,
        case_insensitive = true
    )]
    pub collection: Collection,

    /// Start date in format YYYY-MM-DD
    #[structopt(short, long, alias = "start_date")]
    pub start_date: String,

    /// End date in format YYYY-MM-DD [default: today]
    #[structopt(short, long, alias = "end_date")]
    pub end_date: Option<String>,

    /// Credentials file with `username password` on the first line
    #[structopt(short, long, default_value = "auth.txt")]
    pub auth: PathBuf,

    #[structopt(flatten)]
    pub filters: Filters,

    /// Print the search results only, without downloading
    #[structopt(short = "n", long = "no-download", aliases = &["no_download", "dry-run"])]
    pub dry_run: bool,

    /// Target directory for the downloaded products
    #[structopt(short = "p", long, alias = "output_directory", default_value = ".")]
    pub output_directory: PathBuf,

    /// Catalog base URL
    #[structopt(long, env = "PEPS_HOST", default_value = DEFAULT_HOST)]
    pub host: Url,

    /// Issuer id sent with download requests
    #[structopt(long, default_value = "peps")]
    pub issuer: String,
}

impl SearchArgs {
    fn build(self, target: SpatialTarget) -> Result<SearchConfig, Error> {
        if !self.dry_run {
            let output = &self.output_directory;
            if !output.exists() {
                bail!("output directory {} does not exist", output.display());
            }
            if !output.metadata()?.is_dir() {
                bail!("output path {} is not a directory", output.display());
            }
        }

        let end_date = self.end_date.unwrap_or_else(today);
        tracing::debug!(start_date = %self.start_date, %end_date, output = %self.output_directory.display());

        Ok(SearchConfig {
            collection: self.collection,
            start_date: self.start_date,
            end_date,
            target,
            filters: self.filters,
            output_directory: self.output_directory,
            dry_run: self.dry_run,
            credentials_path: self.auth,
            host: self.host,
            issuer: self.issuer,
        })
    }
}

fn today() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Everything a run needs, built once from the command line.
#[derive(Clone, Debug)]
pub struct SearchConfig {
    pub collection: Collection,
    pub start_date: String,
    pub end_date: String,
    pub target: SpatialTarget,
    pub filters: Filters,
    pub output_directory: PathBuf,
    pub dry_run: bool,
    pub credentials_path: PathBuf,
    pub host: Url,
    pub issuer: String,
}
