use serde::{Deserialize, Serialize};

use crate::error::{FairError, FairResult};
use crate::games::{path, Outcome};

/// Caller-supplied multipliers for a path board, one per bucket (`rows + 1` entries).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct PayoutTable(Vec<f64>);

impl PayoutTable {
    pub fn new(multipliers: Vec<f64>) -> FairResult<Self> {
        let rows = multipliers.len().saturating_sub(1) as u32;
        path::validate(rows)?;
        if multipliers.iter().any(|m| !m.is_finite() || *m < 0.0) {
            return Err(FairError::InvalidPayoutTable(
                "multipliers must be finite and non-negative".into(),
            ));
        }
        Ok(Self(multipliers))
    }

    /// Curve where every bucket returns the same share, giving an overall
    /// return of `1 - house_edge`. Edge buckets pay the most.
    pub fn balanced(rows: u32, house_edge: f64) -> FairResult<Self> {
        path::validate(rows)?;
        let buckets = f64::from(rows + 1);
        let multipliers = bucket_probabilities(rows)
            .into_iter()
            .map(|p| (1.0 - house_edge) / (p * buckets))
            .collect();
        Self::new(multipliers)
    }

    pub fn rows(&self) -> u32 {
        (self.0.len() - 1) as u32
    }

    pub fn multipliers(&self) -> &[f64] {
        &self.0
    }

    pub fn multiplier(&self, bucket: u32) -> Option<f64> {
        self.0.get(bucket as usize).copied()
    }

    /// Multiplier for a path outcome; `None` for other games or out-of-range buckets.
    pub fn for_outcome(&self, outcome: &Outcome) -> Option<f64> {
        match outcome {
            Outcome::Path(bucket) => self.multiplier(*bucket),
            _ => None,
        }
    }

    /// Expected return per unit staked.
    pub fn expected_return(&self) -> f64 {
        bucket_probabilities(self.rows())
            .iter()
            .zip(&self.0)
            .map(|(p, m)| p * m)
            .sum()
    }
}

impl TryFrom<Vec<f64>> for PayoutTable {
    type Error = FairError;

    fn try_from(v: Vec<f64>) -> FairResult<Self> {
        Self::new(v)
    }
}

impl From<PayoutTable> for Vec<f64> {
    fn from(t: PayoutTable) -> Self {
        t.0
    }
}

/// Binomial(rows, 1/2) probabilities of landing in each bucket.
pub fn bucket_probabilities(rows: u32) -> Vec<f64> {
    let total = 2f64.powi(rows as i32);
    let mut coeff = 1.0f64;
    let mut out = Vec::with_capacity(rows as usize + 1);
    for k in 0..=rows {
        out.push(coeff / total);
        coeff = coeff * f64::from(rows - k) / f64::from(k + 1);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probabilities_sum_to_one() {
        let p = bucket_probabilities(8);
        assert_eq!(p.len(), 9);
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert_eq!(p[0], 1.0 / 256.0);
        assert_eq!(p[4], 70.0 / 256.0);
    }

    #[test]
    fn balanced_table_hits_edge() {
        let table = PayoutTable::balanced(12, 0.01).unwrap();
        assert_eq!(table.rows(), 12);
        assert!((table.expected_return() - 0.99).abs() < 1e-9);
        assert!(table.multiplier(0).unwrap() > table.multiplier(6).unwrap());
        assert_eq!(table.multiplier(13), None);
        assert_eq!(table.for_outcome(&Outcome::Dice(1.0)), None);
        assert_eq!(table.for_outcome(&Outcome::Path(0)), table.multiplier(0));
    }

    #[test]
    fn rejects_malformed_tables() {
        assert!(PayoutTable::new(vec![1.0]).is_err());
        assert!(PayoutTable::new(vec![]).is_err());
        assert!(PayoutTable::new(vec![1.0, f64::NAN]).is_err());
        assert!(PayoutTable::new(vec![1.0, -2.0]).is_err());
        assert!(serde_json::from_str::<PayoutTable>("[2.0, 0.5, 2.0]").is_ok());
        assert!(serde_json::from_str::<PayoutTable>("[2.0]").is_err());
    }
}
