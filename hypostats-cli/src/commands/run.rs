//! `hypostats run`

use std::path::PathBuf;

use anyhow::{bail, Context as _, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use hypostats_core::{
    values_to_csv, ClaimKind, HypothesisTestRequest, HypothesisTestResponse, TailDirection,
};
use hypostats_engine::HypothesisTestEngine;
use hypostats_sdk::{ComputeClient, SdkConfig};
use serde::Serialize;

use crate::context::Context;
use crate::output::{field_table, format_number, print_section, TableDisplay};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Claim {
    /// Population mean (or difference of means)
    Mean,
    /// Population standard deviation (or ratio of variances)
    Variance,
}

impl From<Claim> for ClaimKind {
    fn from(claim: Claim) -> Self {
        match claim {
            Claim::Mean => ClaimKind::Mean,
            Claim::Variance => ClaimKind::Variance,
        }
    }
}

/// Where the observations come from, shared by `run` and `analyze`.
#[derive(Debug, Args)]
pub struct DataArgs {
    /// CSV file, one value per row (one sample) or two columns (two samples)
    #[arg(conflicts_with = "data")]
    pub file: Option<PathBuf>,

    /// Values of sample 1, separated by commas or whitespace
    #[arg(long)]
    pub data: Option<String>,

    /// Values of sample 2, separated by commas or whitespace
    #[arg(long, requires = "data")]
    pub data2: Option<String>,
}

impl DataArgs {
    pub fn is_given(&self) -> bool {
        self.file.is_some() || self.data.is_some()
    }

    pub fn csv_data(&self) -> Result<String> {
        match (&self.file, &self.data) {
            (Some(path), _) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display())),
            (None, Some(data)) => Ok(values_to_csv(data, self.data2.as_deref())),
            (None, None) => bail!("provide a CSV file or --data"),
        }
    }
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub input: DataArgs,

    /// Number of samples; inferred from --data2 when omitted
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u8).range(1..=2))]
    pub samples: Option<u8>,

    /// Parameter the claim is about
    #[arg(short, long, value_enum, default_value_t = Claim::Mean)]
    pub claim: Claim,

    /// Significance level
    #[arg(short, long, default_value_t = 0.05)]
    pub alpha: f64,

    /// Hypothesized mean, mean difference or standard deviation
    #[arg(short = 'H', long, allow_negative_numbers = true)]
    pub hypothesized: Option<f64>,

    /// Alternative hypothesis: greater, less or equal (two-sided)
    #[arg(short, long, default_value = "equal")]
    pub direction: TailDirection,

    /// Known population parameter for sample 1 (σ for mean claims)
    #[arg(long)]
    pub known_param: Option<f64>,

    /// Known population parameter for sample 2
    #[arg(long, requires = "known_param")]
    pub known_param2: Option<f64>,

    /// Send the request to a running hypostats server instead of the local engine
    #[arg(long, env = "HYPOSTATS_REMOTE_URL")]
    pub remote: Option<String>,
}

impl RunArgs {
    fn sample_count(&self) -> u8 {
        self.samples
            .unwrap_or(if self.input.data2.is_some() { 2 } else { 1 })
    }

    pub fn to_request(&self) -> Result<HypothesisTestRequest> {
        let known = self.known_param.is_some();
        Ok(HypothesisTestRequest {
            num_samples: Some(self.sample_count()),
            claim_type: Some(ClaimKind::from(self.claim).code()),
            p_value: Some(self.alpha),
            csv_data: Some(self.input.csv_data()?),
            is_known: Some(if known { "yes" } else { "no" }.to_string()),
            hypothesized_value: self.hypothesized,
            known_param: self.known_param,
            known_param2: self.known_param2,
            claim_direction: Some(self.direction),
        })
    }
}

pub async fn execute(args: &RunArgs, ctx: &Context) -> Result<()> {
    let request = args.to_request()?;
    let response = run_request(request, args.remote.as_deref(), ctx).await?;
    ctx.output.write(&TestReport(response))
}

/// Run on the server at `remote` when given, otherwise in-process.
pub(crate) async fn run_request(
    request: HypothesisTestRequest,
    remote: Option<&str>,
    ctx: &Context,
) -> Result<HypothesisTestResponse> {
    match remote {
        Some(url) => {
            let client = ComputeClient::from_config(SdkConfig::new(url))
                .context("invalid remote configuration")?;
            let spinner = ctx.output.spinner("Running test on remote server...");
            let response = client.run(&request).await;
            if let Some(pb) = spinner {
                pb.finish_and_clear();
            }
            Ok(response?)
        }
        None => {
            let request = request.into_test_request()?;
            Ok(HypothesisTestEngine::new().run(&request)?.into())
        }
    }
}

#[derive(Serialize)]
#[serde(transparent)]
pub(crate) struct TestReport(pub(crate) HypothesisTestResponse);

impl TableDisplay for TestReport {
    fn display_single(&self) {
        let d = &self.0.details;
        let number = |v: Option<f64>| v.map(format_number);
        let count = |v: Option<usize>| v.map(|n| n.to_string());

        if self.0.rejects_null() {
            println!("{}", self.0.conclusion.red().bold());
        } else {
            println!("{}", self.0.conclusion.green().bold());
        }

        print_section("Test");
        println!(
            "{}",
            field_table(&[
                ("Test", d.test_type.clone()),
                ("Test statistic", number(d.test_statistic)),
                ("Critical value", number(d.critical_value)),
                ("Lower critical value", number(d.critical_value_lower)),
                ("Upper critical value", number(d.critical_value_upper)),
                ("p-value", number(d.p_value)),
                ("Significance", number(d.significance)),
                ("Degrees of freedom", number(d.degrees_of_freedom)),
                ("df1", number(d.df1)),
                ("df2", number(d.df2)),
            ])
        );

        print_section("Samples");
        println!(
            "{}",
            field_table(&[
                ("Size", count(d.sample_size)),
                ("Mean", number(d.sample_mean)),
                ("Std. deviation", number(d.sample_std)),
                ("Variance", number(d.sample_variance)),
                ("Size (1)", count(d.sample_size1)),
                ("Size (2)", count(d.sample_size2)),
                ("Mean (1)", number(d.sample_mean1)),
                ("Mean (2)", number(d.sample_mean2)),
                ("Std. deviation (1)", number(d.sample_std1)),
                ("Std. deviation (2)", number(d.sample_std2)),
                ("Variance (1)", number(d.sample_variance1)),
                ("Variance (2)", number(d.sample_variance2)),
            ])
        );
    }

    fn display_compact(&self) {
        let d = &self.0.details;
        println!(
            "{}: statistic={} critical={} p={} reject={}",
            d.test_type.as_deref().unwrap_or("test"),
            d.test_statistic.map(format_number).unwrap_or_default(),
            d.critical_value.map(format_number).unwrap_or_default(),
            d.p_value.map(format_number).unwrap_or_default(),
            self.0.rejects_null()
        );
    }
}
