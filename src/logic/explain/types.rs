use serde::{Deserialize, Serialize};

/// One feature's share of the model margin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureContribution {
    pub name: String,
    /// Feature value in the explained row
    pub value: f64,
    /// Additive contribution in margin (log-odds) space
    pub contribution: f64,
}

/// Local explanation of one row
///
/// `baseline + sum(contributions) == margin` within float tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    /// Expected model margin with no evidence about the row
    pub baseline: f64,
    /// Model margin for the row
    pub margin: f64,
    /// One entry per feature, in feature row order
    pub attributions: Vec<FeatureContribution>,
}

impl Explanation {
    pub fn contribution_sum(&self) -> f64 {
        self.attributions.iter().map(|a| a.contribution).sum()
    }

    /// `baseline + sum(contributions)`
    pub fn reconstructed_margin(&self) -> f64 {
        self.baseline + self.contribution_sum()
    }

    /// Largest contributions by magnitude
    pub fn top_contributors(&self, n: usize) -> Vec<&FeatureContribution> {
        let mut sorted: Vec<_> = self.attributions.iter().collect();
        sorted.sort_by(|a, b| b.contribution.abs().total_cmp(&a.contribution.abs()));
        sorted.truncate(n);
        sorted
    }
}

/// How split statistics are aggregated per feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImportanceType {
    /// Number of splits on the feature
    Weight,
    /// Mean loss reduction per split
    #[default]
    Gain,
    /// Summed loss reduction
    TotalGain,
    /// Mean cover per split
    Cover,
    /// Summed cover
    TotalCover,
}

impl std::str::FromStr for ImportanceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weight" => Ok(Self::Weight),
            "gain" => Ok(Self::Gain),
            "total_gain" => Ok(Self::TotalGain),
            "cover" => Ok(Self::Cover),
            "total_cover" => Ok(Self::TotalCover),
            other => Err(format!("unknown importance type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportanceScore {
    pub feature: String,
    pub score: f64,
}

/// Global importance, one score per feature in feature row order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub importance_type: ImportanceType,
    pub scores: Vec<ImportanceScore>,
}

impl FeatureImportance {
    /// Scale scores to sum to 1 (no-op when all are zero)
    pub fn normalized(mut self) -> Self {
        let total: f64 = self.scores.iter().map(|s| s.score).sum();
        if total > 0.0 {
            for s in &mut self.scores {
                s.score /= total;
            }
        }
        self
    }

    /// Highest first; ties keep column order
    pub fn ranked(&self) -> Vec<&ImportanceScore> {
        let mut sorted: Vec<_> = self.scores.iter().collect();
        sorted.sort_by(|a, b| b.score.total_cmp(&a.score));
        sorted
    }

    pub fn top_n(&self, n: usize) -> Vec<&ImportanceScore> {
        let mut ranked = self.ranked();
        ranked.truncate(n);
        ranked
    }

    pub fn get(&self, feature: &str) -> Option<f64> {
        self.scores.iter().find(|s| s.feature == feature).map(|s| s.score)
    }
}
