//! Writes a synthetic `credit_risk_predictions.csv` for trying the dashboard
//! without a real model export.
//!
//! Usage: `generate_sample [OUTPUT.csv] [ROWS]`

use anyhow::{Context, Result};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// One synthetic customer.
struct Customer {
    age: i64,
    monthly_income: Option<f64>,
    debt_ratio: f64,
    utilization: f64,
    late_payments: u32,
    dependents: u32,
}

impl Customer {
    fn generate(rng: &mut SimpleRng) -> Self {
        let age = rng.gauss(52.0, 14.0).round().clamp(21.0, 95.0) as i64;
        // Roughly one in five exports has no income on file.
        let monthly_income = (!rng.chance(0.2))
            .then(|| rng.gauss(8.6, 0.6).exp().round().clamp(0.0, 250_000.0));
        let debt_ratio = (rng.gauss(-1.1, 0.9).exp()).min(20.0);
        let utilization = rng.next_f64().powf(1.8);
        let late_payments = if rng.chance(0.15) {
            1 + (rng.next_f64() * 4.0) as u32
        } else {
            0
        };
        let dependents = (rng.next_f64() * 4.0) as u32;
        Customer {
            age,
            monthly_income,
            debt_ratio,
            utilization,
            late_payments,
            dependents,
        }
    }

    /// A plausible default probability; no real model behind it.
    fn probability(&self, rng: &mut SimpleRng) -> f64 {
        let income_term = self
            .monthly_income
            .map(|m| -0.35 * (m.max(1.0).ln() - 8.6))
            .unwrap_or(0.2);
        let logit = -3.2 + 2.6 * self.utilization + 0.9 * self.late_payments as f64
            - 0.025 * (self.age - 50) as f64
            + 0.3 * self.debt_ratio.min(3.0)
            + income_term
            + rng.gauss(0.0, 0.4);
        sigmoid(logit)
    }
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let output_path = args
        .next()
        .unwrap_or_else(|| "credit_risk_predictions.csv".to_string());
    let rows: usize = match args.next() {
        Some(n) => n.parse().with_context(|| format!("'{n}' is not a row count"))?,
        None => 5000,
    };

    let mut rng = SimpleRng::new(42);
    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("creating {output_path}"))?;

    writer.write_record([
        "CustomerId",
        "RevolvingUtilizationOfUnsecuredLines",
        "age",
        "NumberOfTimesPastDue",
        "DebtRatio",
        "MonthlyIncome",
        "NumberOfDependents",
        "Predicted_Probability",
    ])?;

    for id in 0..rows {
        let c = Customer::generate(&mut rng);
        let p = c.probability(&mut rng);
        writer.write_record([
            (id + 1).to_string(),
            format!("{:.6}", c.utilization),
            c.age.to_string(),
            c.late_payments.to_string(),
            format!("{:.6}", c.debt_ratio),
            c.monthly_income.map(|m| format!("{m:.1}")).unwrap_or_default(),
            c.dependents.to_string(),
            format!("{p:.6}"),
        ])?;
    }
    writer.flush().context("flushing CSV")?;

    println!("Wrote {rows} customers to {output_path}");
    Ok(())
}
