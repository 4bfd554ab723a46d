//! `hypostats analyze`
//!
//! Extracts the test setup from a word problem. Given data, it then runs
//! the extracted test on it, locally or on `--remote`.

use anyhow::{Context as _, Result};
use clap::Args;
use hypostats_sdk::{
    AnalyzedQuestion, AnalyzerSettings, QuestionAnalyzer, DEFAULT_ANALYZER_BASE_URL,
    DEFAULT_ANALYZER_MODEL,
};
use serde::Serialize;

use crate::commands::run::{run_request, DataArgs, TestReport};
use crate::context::Context;
use crate::output::{field_table, format_number, print_section, TableDisplay};

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// The question, e.g. "Is the mean battery life above 10 hours?"
    pub question: String,

    /// API key for the chat-completion service
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, env = "HYPOSTATS_ANALYZER_BASE_URL", default_value = DEFAULT_ANALYZER_BASE_URL)]
    pub base_url: String,

    /// Model used for extraction
    #[arg(long, default_value = DEFAULT_ANALYZER_MODEL)]
    pub model: String,

    /// Observations to run the extracted test on
    #[command(flatten)]
    pub input: DataArgs,

    /// Run the extracted test on a hypostats server instead of the local engine
    #[arg(long, env = "HYPOSTATS_REMOTE_URL")]
    pub remote: Option<String>,
}

pub async fn execute(args: &AnalyzeArgs, ctx: &Context) -> Result<()> {
    let settings = AnalyzerSettings::new(args.api_key.clone())
        .with_base_url(args.base_url.clone())
        .with_model(args.model.clone());
    let analyzer = QuestionAnalyzer::from_settings(&settings).context("invalid analyzer settings")?;

    let spinner = ctx.output.spinner("Analyzing question...");
    let analysis = analyzer.analyze(&args.question).await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    let analysis = analysis.context("Failed to analyze question")?;

    if !args.input.is_given() {
        return ctx.output.write(&AnalysisReport(analysis));
    }

    let request = analysis.clone().into_request(args.input.csv_data()?);
    let response = run_request(request, args.remote.as_deref(), ctx).await?;
    ctx.output.write(&AnalyzedTestReport {
        analysis: AnalysisReport(analysis),
        result: TestReport(response),
    })
}

/// Extracted parameters together with the outcome of running them.
#[derive(Serialize)]
struct AnalyzedTestReport {
    analysis: AnalysisReport,
    result: TestReport,
}

impl TableDisplay for AnalyzedTestReport {
    fn display_single(&self) {
        print_section("Analysis");
        self.analysis.display_single();
        print_section("Result");
        self.result.display_single();
    }

    fn display_compact(&self) {
        self.analysis.display_compact();
        self.result.display_compact();
    }
}

#[derive(Serialize)]
#[serde(transparent)]
struct AnalysisReport(AnalyzedQuestion);

impl TableDisplay for AnalysisReport {
    fn display_single(&self) {
        let a = &self.0;
        let claim = match a.claim_type {
            1 => "mean",
            2 => "standard deviation / variance",
            _ => "unknown",
        };
        println!(
            "{}",
            field_table(&[
                ("Samples", Some(a.num_samples.to_string())),
                ("Claim about", Some(claim.to_string())),
                ("Significance", Some(format_number(a.p_value))),
                ("Parameter known", Some(a.is_known.clone())),
                ("Hypothesized value", Some(format_number(a.hypothesized_value))),
                ("Known parameter (1)", a.known_param.map(format_number)),
                ("Known parameter (2)", a.known_param2.map(format_number)),
                ("Alternative", Some(a.claim_direction.phrase().to_string())),
            ])
        );
        if let Some(explanation) = &a.explanation {
            println!("\n{}", explanation);
        }
    }

    fn display_compact(&self) {
        let a = &self.0;
        println!(
            "samples={} claim={} alpha={} known={} value={} direction={}",
            a.num_samples, a.claim_type, a.p_value, a.is_known, a.hypothesized_value, a.claim_direction
        );
    }
}
