use std::{collections::HashMap, fs, path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use solver::{solve_subset_selection, SolveOptions, SolveStatus};

#[derive(Parser, Debug)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Solve eligible-paycode selection for every row of a payroll CSV and
    /// suggest a mapping from the per-employee selections.
    BatchInfer {
        /// Payroll CSV with employee_id, contribution_amount,
        /// contribution_rate, period, and one column per paycode.
        input: PathBuf,
        #[arg(long, default_value_t = 2.0)]
        time_limit_seconds: f64,
        #[arg(long, default_value_t = 20)]
        max_candidates: usize,
        /// Selection frequency required to suggest a paycode as eligible.
        #[arg(long, default_value_t = 0.5)]
        threshold: f64,
    },
    /// Write a small deterministic sample payroll CSV.
    GenerateSample { output: PathBuf },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let cli = Cli::parse();

    match cli.command {
        Command::BatchInfer {
            input,
            time_limit_seconds,
            max_candidates,
            threshold,
        } => {
            let raw = fs::read_to_string(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let rows = parse_payroll_csv(&raw)?;
            let options = SolveOptions {
                time_limit: Duration::from_secs_f64(time_limit_seconds),
                max_candidates,
                ..SolveOptions::default()
            };
            let report = run_batch(&rows, &options, threshold);
            print_report(&report, threshold);
        }
        Command::GenerateSample { output } => {
            fs::write(&output, SAMPLE_PAYROLL_CSV)
                .with_context(|| format!("failed to write {}", output.display()))?;
            println!("wrote sample payroll to {}", output.display());
        }
    }

    Ok(())
}

#[derive(Debug)]
struct PayrollRow {
    employee_id: String,
    contribution_amount: f64,
    contribution_rate: f64,
    paycode_values: HashMap<String, f64>,
}

/// Header-keyed CSV: the reserved columns are employee_id,
/// contribution_amount, contribution_rate, and period; everything else is a
/// paycode column.
fn parse_payroll_csv(raw: &str) -> Result<Vec<PayrollRow>> {
    let mut lines = raw.lines().filter(|line| !line.trim().is_empty());
    let header = lines.next().context("payroll csv is empty")?;
    let columns: Vec<&str> = header.split(',').map(str::trim).collect();
    for required in ["employee_id", "contribution_amount", "contribution_rate"] {
        if !columns.contains(&required) {
            bail!("payroll csv is missing required column '{required}'");
        }
    }

    let mut rows = Vec::new();
    for (index, line) in lines.enumerate() {
        let line_no = index + 2;
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != columns.len() {
            bail!(
                "row {line_no} has {} fields, expected {}",
                fields.len(),
                columns.len()
            );
        }

        let mut employee_id = String::new();
        let mut contribution_amount = 0.0;
        let mut contribution_rate = 0.0;
        let mut paycode_values = HashMap::new();
        for (column, field) in columns.iter().zip(&fields) {
            match *column {
                "employee_id" => employee_id = (*field).to_string(),
                "contribution_amount" => {
                    contribution_amount = field.parse().with_context(|| {
                        format!("row {line_no}: invalid contribution_amount '{field}'")
                    })?;
                }
                "contribution_rate" => {
                    contribution_rate = field.parse().with_context(|| {
                        format!("row {line_no}: invalid contribution_rate '{field}'")
                    })?;
                }
                "period" => {}
                paycode => {
                    let value: f64 = field.parse().with_context(|| {
                        format!("row {line_no}: invalid value '{field}' for paycode '{paycode}'")
                    })?;
                    paycode_values.insert(paycode.to_string(), value);
                }
            }
        }
        rows.push(PayrollRow {
            employee_id,
            contribution_amount,
            contribution_rate,
            paycode_values,
        });
    }

    Ok(rows)
}

struct EmployeeResult {
    employee_id: String,
    /// `None` when the row was skipped for a zero contribution rate.
    eligible_estimate: Option<f64>,
    selected: Vec<String>,
    status: Option<SolveStatus>,
}

struct BatchReport {
    per_employee: Vec<EmployeeResult>,
    /// Per-paycode selection counts, most-selected first.
    selection_counts: Vec<(String, usize)>,
    total_rows: usize,
    /// Paycodes selected in at least the threshold fraction of rows.
    suggested: Vec<String>,
}

fn run_batch(rows: &[PayrollRow], options: &SolveOptions, threshold: f64) -> BatchReport {
    let mut counter: HashMap<String, usize> = HashMap::new();
    let mut per_employee = Vec::with_capacity(rows.len());

    for row in rows {
        if row.contribution_rate == 0.0 {
            per_employee.push(EmployeeResult {
                employee_id: row.employee_id.clone(),
                eligible_estimate: None,
                selected: Vec::new(),
                status: None,
            });
            continue;
        }

        let eligible = row.contribution_amount / row.contribution_rate;
        let solution = solve_subset_selection(&row.paycode_values, eligible, options);
        for code in &solution.selected {
            *counter.entry(code.clone()).or_default() += 1;
        }
        per_employee.push(EmployeeResult {
            employee_id: row.employee_id.clone(),
            eligible_estimate: Some(eligible),
            selected: solution.selected,
            status: Some(solution.status),
        });
    }

    let total_rows = rows.len();
    let mut selection_counts: Vec<(String, usize)> = counter.into_iter().collect();
    selection_counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let suggested = selection_counts
        .iter()
        .filter(|(_, count)| total_rows > 0 && *count as f64 / total_rows as f64 >= threshold)
        .map(|(code, _)| code.clone())
        .collect();

    BatchReport {
        per_employee,
        selection_counts,
        total_rows,
        suggested,
    }
}

fn print_report(report: &BatchReport, threshold: f64) {
    println!("Per-employee results:");
    for result in &report.per_employee {
        match result.eligible_estimate {
            Some(eligible) => println!(
                "{} eligible_est={eligible:.2} status={:?} selected={:?}",
                result.employee_id,
                result.status.unwrap_or(SolveStatus::Infeasible),
                result.selected
            ),
            None => println!(
                "{} skipped (zero contribution rate)",
                result.employee_id
            ),
        }
    }

    println!();
    println!("Selection counts:");
    for (code, count) in &report.selection_counts {
        println!(
            "{code} {count} / {} ({:.2})",
            report.total_rows,
            *count as f64 / report.total_rows as f64
        );
    }

    println!();
    println!(
        "Suggested eligible paycodes (>={:.0}%): {:?}",
        threshold * 100.0,
        report.suggested
    );
}

const SAMPLE_PAYROLL_CSV: &str = "\
employee_id,period,contribution_amount,contribution_rate,base_pay,overtime,bonus,car_allowance
E001,2024-01,561.05,0.1,5200.00,410.50,300.00,150.00
E002,2024-01,0.00,0.0,4100.00,0.00,0.00,150.00
E003,2024-01,505.00,0.1,4800.00,120.00,250.00,0.00
E004,2024-01,500.00,0.1,5000.00,80.00,60.00,200.00
";
