//! VaR/ES report example
//!
//! Estimates rolling GBM parameters for a synthetic price history, runs all
//! three VaR/ES methods, backtests the parametric forecasts and compares an
//! unhedged position with a stock plus protective put split.
//!
//! Run with: cargo run --example var_report

use chrono::NaiveDate;
use gbm_risk::backtest;
use gbm_risk::{
    HedgeAnalysis, HedgeRequest, ParameterTable, PricePoint, PriceSeries, RiskConfig, RiskFacade,
    RiskMethod, RiskRequest,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== VaR / ES Report Example ===\n");

    // 1. Synthetic daily closes, ~8 years of trading
    let start = NaiveDate::from_ymd_opt(2009, 1, 2).ok_or("invalid start date")?;
    let mut price = 85.0;
    let points = (0..2_000)
        .map(|i| {
            let shock = (i as f64 * 0.7).sin() * 0.011 + ((i * 13) % 7) as f64 * 0.0006 - 0.0015;
            price *= (shock + 0.0003f64).exp();
            PricePoint::new(start + chrono::Duration::days(i), price)
        })
        .collect();
    let prices = PriceSeries::new("DEMO", points)?;

    let latest = prices.latest();
    println!("Series: {} ({} closes)", prices.name(), prices.len());
    println!("Latest close: {:.2} on {}", latest.price, latest.date);
    println!();

    // 2. Configuration, normally read from a YAML file
    let config = RiskConfig::from_yaml(
        "monte_carlo_paths: 2000\nhedge_paths: 200000\nrandom_seed: 42\nparameter_windows_years: [2, 5]\n",
    )?;

    // 3. Rolling parameters
    println!("--- Rolling GBM parameters ---");
    let table = ParameterTable::build(&prices, &config.parameter_windows_years)?;
    for row in table.rows.iter().take(3) {
        print!("{}", row.date);
        for (years, (mu, sigma)) in table.windows_years.iter().zip(row.mu.iter().zip(&row.sigma)) {
            print!("  {}y mu={:.4} sigma={:.4}", years, mu, sigma);
        }
        println!();
    }
    println!();

    // 4. VaR/ES by each method
    let facade = RiskFacade::new(config.clone());
    let request = RiskRequest {
        method: RiskMethod::Parametric,
        v0: 10_000.0,
        var_prob: 0.99,
        es_prob: 0.975,
        window_years: 2.0,
        horizon_years: 5.0 / 252.0,
        display_len: Some(250),
    };

    for name in ["Parametric VaR/ES", "Historical VaR/ES", "Monte Carlo VaR/ES"] {
        let report = facade.compute_named(name, &prices, request.clone())?;
        let row = report.rows()[0];
        println!("--- {} ---", name);
        println!("  {}: VaR {:.2}, ES {:.2}", row.date, row.var, row.es);
        println!("  Output file stem: {}", report.file_stem());
    }

    match facade.compute_named("Delta-Normal VaR/ES", &prices, request.clone()) {
        Ok(_) => println!("Unexpected success"),
        Err(e) => println!("Rejected: {}", e),
    }
    println!();

    // 5. Backtest the parametric forecasts
    println!("--- Backtest ---");
    let report = facade.compute(&prices, &request)?;
    let rows = backtest::compare(request.v0, &prices, &report.var, request.horizon_days(), 250)?;
    let result = backtest::evaluate(&rows, request.var_prob)?;
    println!("  Predictions: {}", result.num_predictions);
    println!(
        "  Violations: {} ({:.2}% vs {:.2}% expected)",
        result.num_violations,
        result.violation_rate * 100.0,
        result.expected_violation_rate * 100.0
    );
    println!("  Validated: {}", result.validated);
    println!();

    // 6. Protective put hedge
    println!("--- Hedge analysis ---");
    let analysis = HedgeAnalysis::new(config);
    let hedge = analysis.run(
        &prices,
        &HedgeRequest {
            v0: 1_000_000.0,
            liquidity_ratio: 0.05,
            risk_free_rate: 0.005,
            maturity: 0.5,
            implied_vol: 0.21,
            var_prob: 0.99,
            window_years: 2.0,
            horizon_years: 5.0 / 252.0,
        },
    )?;
    for (label, value) in hedge.rows() {
        println!("  {:<28} {:>14.4}", label, value);
    }

    println!("\n{}", serde_json::to_string_pretty(&hedge)?);

    Ok(())
}
