use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use planvision::core::{
    self, DEFAULT_EXPENSE_MULTIPLE, EducationInputs, LoanInputs, RetirementInputs, SipInputs,
    SwpInputs,
};

#[derive(Parser, Debug)]
#[command(
    name = "planvision",
    about = "Financial planning toolkit (SIP, EMI, retirement, SWP and education projections)"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP API and web UI
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Project the maturity value of a monthly SIP
    Sip {
        #[arg(long)]
        monthly_investment: f64,
        #[arg(long, help = "Expected annual return, percent")]
        expected_return: f64,
        #[arg(long)]
        tenure_years: u32,
    },
    /// Compute the EMI and amortization schedule for a loan
    Loan {
        #[arg(long)]
        principal: f64,
        #[arg(long, help = "Annual interest rate, percent")]
        interest_rate: f64,
        #[arg(long)]
        tenure_years: u32,
    },
    /// Estimate the corpus needed at retirement
    Retirement {
        #[arg(long)]
        current_age: u32,
        #[arg(long)]
        retire_age: u32,
        #[arg(long)]
        monthly_expenses: f64,
        #[arg(long, default_value_t = 6.0, help = "Annual inflation rate, percent")]
        inflation_rate: f64,
    },
    /// Simulate a systematic withdrawal plan
    Swp {
        #[arg(long)]
        corpus: f64,
        #[arg(long)]
        monthly_withdrawal: f64,
        #[arg(long, help = "Expected annual return, percent")]
        expected_return: f64,
        #[arg(long)]
        tenure_years: u32,
    },
    /// Project the future cost of an education goal
    Education {
        #[arg(long)]
        current_cost: f64,
        #[arg(long)]
        years_to_goal: u32,
        #[arg(long, default_value_t = 10.0, help = "Annual inflation rate, percent")]
        inflation_rate: f64,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<H: Serialize, R: Serialize> {
    #[serde(flatten)]
    headline: H,
    schedule: Vec<R>,
}

fn print_report<H: Serialize, R: Serialize>(headline: H, schedule: Vec<R>) {
    let report = Report { headline, schedule };
    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Failed to encode report: {e}");
            std::process::exit(1);
        }
    }
}

fn bail(e: impl std::fmt::Display) -> ! {
    eprintln!("Error: {e}");
    std::process::exit(1);
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MaturityValue {
    maturity_value: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MonthlyEmi {
    monthly_emi: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CorpusTarget {
    corpus_target: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FinalBalance {
    final_balance: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FutureCost {
    future_cost: f64,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve { port } => {
            if let Err(e) = planvision::api::run_http_server(port).await {
                eprintln!("Server error: {e}");
                std::process::exit(1);
            }
        }
        Command::Sip {
            monthly_investment,
            expected_return,
            tenure_years,
        } => {
            let inputs = SipInputs {
                monthly_investment,
                expected_return,
                tenure_years,
            };
            match core::sip_future_value(&inputs) {
                Ok(p) => print_report(
                    MaturityValue {
                        maturity_value: p.headline,
                    },
                    p.rows,
                ),
                Err(e) => bail(e),
            }
        }
        Command::Loan {
            principal,
            interest_rate,
            tenure_years,
        } => {
            let inputs = LoanInputs {
                principal,
                interest_rate,
                tenure_years,
            };
            match core::loan_amortization(&inputs) {
                Ok(p) => print_report(
                    MonthlyEmi {
                        monthly_emi: p.headline,
                    },
                    p.rows,
                ),
                Err(e) => bail(e),
            }
        }
        Command::Retirement {
            current_age,
            retire_age,
            monthly_expenses,
            inflation_rate,
        } => {
            let inputs = RetirementInputs {
                current_age,
                retire_age,
                monthly_expenses,
                inflation_rate,
            };
            match core::retirement_corpus(&inputs, DEFAULT_EXPENSE_MULTIPLE) {
                Ok(p) => print_report(
                    CorpusTarget {
                        corpus_target: p.headline,
                    },
                    p.rows,
                ),
                Err(e) => bail(e),
            }
        }
        Command::Swp {
            corpus,
            monthly_withdrawal,
            expected_return,
            tenure_years,
        } => {
            let inputs = SwpInputs {
                corpus,
                monthly_withdrawal,
                expected_return,
                tenure_years,
            };
            match core::swp_projection(&inputs) {
                Ok(p) => print_report(
                    FinalBalance {
                        final_balance: p.headline,
                    },
                    p.rows,
                ),
                Err(e) => bail(e),
            }
        }
        Command::Education {
            current_cost,
            years_to_goal,
            inflation_rate,
        } => {
            let inputs = EducationInputs {
                current_cost,
                years_to_goal,
                inflation_rate,
            };
            match core::education_cost(&inputs) {
                Ok(p) => print_report(
                    FutureCost {
                        future_cost: p.headline,
                    },
                    p.rows,
                ),
                Err(e) => bail(e),
            }
        }
    }
}
