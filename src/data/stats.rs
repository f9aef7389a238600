use std::collections::BTreeMap;

use super::model::{Dataset, PassengerClass, COLUMNS};

/// Bins used for the age distribution chart.
pub const AGE_BINS: usize = 30;

// ---------------------------------------------------------------------------
// Overview
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overview {
    pub passengers: usize,
    pub survivors: usize,
    /// Percentage in [0, 100]; 0 for an empty dataset.
    pub survival_rate: f64,
    pub feature_count: usize,
}

pub fn overview(dataset: &Dataset) -> Overview {
    let passengers = dataset.len();
    let survivors = dataset.records.iter().filter(|r| r.survived).count();
    let survival_rate = if passengers == 0 {
        0.0
    } else {
        survivors as f64 / passengers as f64 * 100.0
    };
    Overview {
        passengers,
        survivors,
        survival_rate,
        feature_count: dataset.feature_count(),
    }
}

// ---------------------------------------------------------------------------
// Grouped aggregates
// ---------------------------------------------------------------------------

/// Count / sum / mean of `Survived` for one ticket class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassSurvival {
    pub pclass: PassengerClass,
    pub total: usize,
    pub survived: usize,
    pub rate: f64,
}

/// Per-class survival, ordered by class ascending. Classes without
/// passengers are omitted.
pub fn survival_by_class(dataset: &Dataset) -> Vec<ClassSurvival> {
    let mut groups: BTreeMap<PassengerClass, (usize, usize)> = BTreeMap::new();
    for rec in &dataset.records {
        let entry = groups.entry(rec.features.pclass).or_default();
        entry.0 += 1;
        entry.1 += usize::from(rec.survived);
    }
    groups
        .into_iter()
        .map(|(pclass, (total, survived))| ClassSurvival {
            pclass,
            total,
            survived,
            rate: survived as f64 / total as f64,
        })
        .collect()
}

/// Passenger counts per class, split `[not survived, survived]`.
pub fn class_counts_by_survival(dataset: &Dataset) -> Vec<(PassengerClass, [usize; 2])> {
    PassengerClass::ALL
        .iter()
        .map(|&pclass| {
            let mut counts = [0usize; 2];
            for rec in dataset.records.iter().filter(|r| r.features.pclass == pclass) {
                counts[usize::from(rec.survived)] += 1;
            }
            (pclass, counts)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Descriptive statistics
// ---------------------------------------------------------------------------

/// Pandas-style `describe()` of one numeric column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Describe {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1).
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl Describe {
    /// `(label, value)` rows in display order.
    pub fn rows(&self) -> [(&'static str, f64); 8] {
        [
            ("count", self.count as f64),
            ("mean", self.mean),
            ("std", self.std),
            ("min", self.min),
            ("25%", self.q25),
            ("50%", self.median),
            ("75%", self.q75),
            ("max", self.max),
        ]
    }
}

pub fn describe(values: &[f64]) -> Describe {
    let count = values.len();
    if count == 0 {
        return Describe {
            count,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            q25: f64::NAN,
            median: f64::NAN,
            q75: f64::NAN,
            max: f64::NAN,
        };
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mean = mean(values);
    let std = if count > 1 {
        let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (count - 1) as f64).sqrt()
    } else {
        f64::NAN
    };

    Describe {
        count,
        mean,
        std,
        min: sorted[0],
        q25: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q75: quantile(&sorted, 0.75),
        max: sorted[count - 1],
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Linear-interpolation quantile of an already sorted, non-empty slice.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// Equal-width histogram with counts split by survival label.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitHistogram {
    /// `bins + 1` edges; the last bin is closed on the right.
    pub edges: Vec<f64>,
    /// `[not survived, survived]`, each of length `bins`.
    pub counts: [Vec<usize>; 2],
}

impl SplitHistogram {
    pub fn bin_width(&self) -> f64 {
        match self.edges.as_slice() {
            [a, b, ..] => b - a,
            _ => 1.0,
        }
    }

    pub fn bin_center(&self, i: usize) -> f64 {
        (self.edges[i] + self.edges[i + 1]) / 2.0
    }
}

pub fn split_histogram(values: &[f64], labels: &[u8], bins: usize) -> SplitHistogram {
    let bins = bins.max(1);
    let mut counts = [vec![0usize; bins], vec![0usize; bins]];

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if values.is_empty() {
        return SplitHistogram {
            edges: (0..=bins).map(|i| i as f64).collect(),
            counts,
        };
    }

    let range = max - min;
    let width = if range.abs() < f64::EPSILON {
        1.0 / bins as f64
    } else {
        range / bins as f64
    };
    let edges: Vec<f64> = (0..=bins).map(|i| min + width * i as f64).collect();

    for (&v, &label) in values.iter().zip(labels) {
        let idx = (((v - min) / width).floor() as usize).min(bins - 1);
        counts[usize::from(label.min(1))][idx] += 1;
    }

    SplitHistogram { edges, counts }
}

pub fn age_histogram(dataset: &Dataset) -> SplitHistogram {
    let ages: Vec<f64> = dataset.records.iter().map(|r| r.features.age).collect();
    split_histogram(&ages, &dataset.labels(), AGE_BINS)
}

// ---------------------------------------------------------------------------
// Box plot summary
// ---------------------------------------------------------------------------

/// Tukey box: whiskers reach the furthest point within 1.5 IQR of the box.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSummary {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

pub fn box_summary(values: &[f64]) -> Option<BoxSummary> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let q1 = quantile(&sorted, 0.25);
    let median = quantile(&sorted, 0.5);
    let q3 = quantile(&sorted, 0.75);
    let iqr = q3 - q1;
    let lo_fence = q1 - 1.5 * iqr;
    let hi_fence = q3 + 1.5 * iqr;

    let inside = sorted.iter().copied().filter(|v| (lo_fence..=hi_fence).contains(v));
    let lower_whisker = inside.clone().fold(f64::INFINITY, f64::min);
    let upper_whisker = inside.fold(f64::NEG_INFINITY, f64::max);
    let outliers = sorted
        .iter()
        .copied()
        .filter(|v| !(lo_fence..=hi_fence).contains(v))
        .collect();

    Some(BoxSummary {
        lower_whisker,
        q1,
        median,
        q3,
        upper_whisker,
        outliers,
    })
}

/// Fare boxes for `[not survived, survived]`.
pub fn fare_by_survival(dataset: &Dataset) -> [Option<BoxSummary>; 2] {
    let fares = |survived: bool| -> Vec<f64> {
        dataset
            .records
            .iter()
            .filter(|r| r.survived == survived)
            .map(|r| r.features.fare)
            .collect()
    };
    [box_summary(&fares(false)), box_summary(&fares(true))]
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Pearson correlation; NaN when either side has zero variance.
pub fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n < 2 {
        return f64::NAN;
    }
    let (a, b) = (&a[..n], &b[..n]);
    let (ma, mb) = (mean(a), mean(b));
    let mut cov = 0.0;
    let mut va = 0.0;
    let mut vb = 0.0;
    for (x, y) in a.iter().zip(b) {
        let (dx, dy) = (x - ma, y - mb);
        cov += dx * dy;
        va += dx * dx;
        vb += dy * dy;
    }
    if va == 0.0 || vb == 0.0 {
        return f64::NAN;
    }
    (cov / (va.sqrt() * vb.sqrt())).clamp(-1.0, 1.0)
}

/// Square matrix over [`COLUMNS`].
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<&'static str>,
    pub values: Vec<Vec<f64>>,
}

pub fn correlation_matrix(dataset: &Dataset) -> CorrelationMatrix {
    let columns: Vec<Vec<f64>> = (0..COLUMNS.len()).map(|i| dataset.column(i)).collect();
    let values = columns
        .iter()
        .enumerate()
        .map(|(i, a)| {
            columns
                .iter()
                .enumerate()
                .map(|(j, b)| {
                    let r = pearson(a, b);
                    if i == j && !r.is_nan() { 1.0 } else { r }
                })
                .collect()
        })
        .collect();
    CorrelationMatrix {
        columns: COLUMNS.to_vec(),
        values,
    }
}

// ---------------------------------------------------------------------------
// Exploration bundle
// ---------------------------------------------------------------------------

/// Everything the analysis page shows, computed in one pass.
#[derive(Debug, Clone)]
pub struct Exploration {
    pub by_class: Vec<ClassSurvival>,
    pub age: Describe,
    pub class_counts: Vec<(PassengerClass, [usize; 2])>,
    pub age_histogram: SplitHistogram,
    pub fare_boxes: [Option<BoxSummary>; 2],
    pub correlation: CorrelationMatrix,
}

impl Exploration {
    pub fn compute(dataset: &Dataset) -> Self {
        let ages: Vec<f64> = dataset.records.iter().map(|r| r.features.age).collect();
        Exploration {
            by_class: survival_by_class(dataset),
            age: describe(&ages),
            class_counts: class_counts_by_survival(dataset),
            age_histogram: age_histogram(dataset),
            fare_boxes: fare_by_survival(dataset),
            correlation: correlation_matrix(dataset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{PassengerFeatures, PassengerRecord, Port, Sex};

    fn passenger(pclass: PassengerClass, age: f64, fare: f64, survived: bool) -> PassengerRecord {
        PassengerRecord {
            features: PassengerFeatures {
                pclass,
                sex: if survived { Sex::Female } else { Sex::Male },
                age,
                sibsp: 0,
                parch: 0,
                fare,
                embarked: Port::Southampton,
            },
            survived,
        }
    }

    /// Ten passengers, four survivors.
    fn fixture() -> Dataset {
        use PassengerClass::*;
        Dataset::new(vec![
            passenger(First, 38.0, 71.28, true),
            passenger(First, 54.0, 51.86, false),
            passenger(Second, 14.0, 30.07, true),
            passenger(Second, 35.0, 26.0, false),
            passenger(Third, 22.0, 7.25, false),
            passenger(Third, 26.0, 7.92, true),
            passenger(Third, 2.0, 21.07, false),
            passenger(Third, 27.0, 11.13, true),
            passenger(Third, 20.0, 8.05, false),
            passenger(Third, 39.0, 31.27, false),
        ])
    }

    #[test]
    fn overview_matches_hand_computation() {
        let o = overview(&fixture());
        assert_eq!(o.passengers, 10);
        assert_eq!(o.survivors, 4);
        assert!((o.survival_rate - 40.0).abs() < 1e-12);
        assert_eq!(o.feature_count, 7);
    }

    #[test]
    fn empty_dataset_has_zero_rate() {
        let o = overview(&Dataset::default());
        assert_eq!(o.survival_rate, 0.0);
    }

    #[test]
    fn class_groups_are_ordered_and_aggregated() {
        let groups = survival_by_class(&fixture());
        let classes: Vec<_> = groups.iter().map(|g| g.pclass).collect();
        assert_eq!(
            classes,
            vec![PassengerClass::First, PassengerClass::Second, PassengerClass::Third]
        );
        assert_eq!((groups[2].total, groups[2].survived), (6, 2));
        assert!((groups[2].rate - 2.0 / 6.0).abs() < 1e-12);

        let counts = class_counts_by_survival(&fixture());
        assert_eq!(counts[0].1, [1, 1]);
        assert_eq!(counts[2].1, [4, 2]);
    }

    #[test]
    fn describe_uses_sample_std_and_linear_quantiles() {
        let d = describe(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(d.count, 4);
        assert!((d.mean - 2.5).abs() < 1e-12);
        assert!((d.std - 1.290_994_448_7).abs() < 1e-9);
        assert!((d.q25 - 1.75).abs() < 1e-12);
        assert!((d.median - 2.5).abs() < 1e-12);
        assert!((d.q75 - 3.25).abs() < 1e-12);
        assert_eq!((d.min, d.max), (1.0, 4.0));
    }

    #[test]
    fn histogram_covers_every_value_once() {
        let ds = fixture();
        let h = age_histogram(&ds);
        assert_eq!(h.edges.len(), AGE_BINS + 1);
        let total: usize = h.counts.iter().flatten().sum();
        assert_eq!(total, ds.len());
        // The maximum lands in the closed last bin.
        assert_eq!(h.counts[1][AGE_BINS - 1] + h.counts[0][AGE_BINS - 1], 1);
        assert_eq!(h.counts[1].iter().sum::<usize>(), 4);
    }

    #[test]
    fn box_summary_separates_outliers() {
        let b = box_summary(&[1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        assert_eq!(b.median, 3.0);
        assert_eq!(b.outliers, vec![100.0]);
        assert_eq!(b.upper_whisker, 4.0);
        assert_eq!(b.lower_whisker, 1.0);
        assert!(box_summary(&[]).is_none());
    }

    #[test]
    fn correlation_is_symmetric_with_unit_diagonal() {
        let m = correlation_matrix(&fixture());
        assert_eq!(m.columns.len(), 8);
        for i in 0..8 {
            for j in 0..8 {
                let (a, b) = (m.values[i][j], m.values[j][i]);
                assert!(a.is_nan() && b.is_nan() || (a - b).abs() < 1e-12);
            }
        }
        // SibSp is constant in the fixture.
        assert!(m.values[4][4].is_nan());
        assert_eq!(m.values[0][0], 1.0);
        // Sex mirrors Survived exactly in the fixture.
        assert!((m.values[0][2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_detects_anticorrelation() {
        assert!((pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]) + 1.0).abs() < 1e-12);
        assert!(pearson(&[1.0], &[1.0]).is_nan());
    }
}
