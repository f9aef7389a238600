use std::fmt::{self, Write};

use crate::artifacts::Artifacts;
use crate::classifier::metrics::{evaluate, Evaluation};
use crate::data::stats::{overview, survival_by_class};
use crate::error::{DashboardError, Result};

/// Plain-text summary for `--report`: overview, class breakdown and model
/// scores.
pub fn render(artifacts: &Artifacts) -> Result<String> {
    let eval = evaluate(&artifacts.model, &artifacts.dataset)?;
    let mut out = String::new();
    write_report(&mut out, artifacts, &eval)
        .map_err(|e| DashboardError::Parse(format!("report: {e}")))?;
    Ok(out)
}

fn write_report(out: &mut impl Write, artifacts: &Artifacts, eval: &Evaluation) -> fmt::Result {
    let dataset = &artifacts.dataset;
    let model = &artifacts.model;

    let o = overview(dataset);
    writeln!(out, "Passengers:     {}", o.passengers)?;
    writeln!(out, "Survival rate:  {:.1}%", o.survival_rate)?;
    writeln!(out, "Features:       {}", o.feature_count)?;
    writeln!(out)?;

    writeln!(out, "{:<8}{:>8}{:>10}{:>8}", "Pclass", "Total", "Survived", "Rate")?;
    for g in survival_by_class(dataset) {
        writeln!(
            out,
            "{:<8}{:>8}{:>10}{:>8.3}",
            g.pclass.code(),
            g.total,
            g.survived,
            g.rate
        )?;
    }
    writeln!(out)?;

    writeln!(out, "Model: {} ({})", model.kind(), artifacts.model_path.display())?;
    writeln!(out, "Accuracy:  {:.3}", eval.accuracy)?;
    writeln!(out, "Precision: {:.3}", eval.precision)?;
    writeln!(out, "Recall:    {:.3}", eval.recall)?;
    writeln!(out, "F1-Score:  {:.3}", eval.f1)?;
    if let Some(auc) = eval.roc_auc {
        writeln!(out, "ROC AUC:   {auc:.3}")?;
    }
    let m = &eval.matrix;
    writeln!(out, "Confusion matrix [actual x predicted]:")?;
    writeln!(out, "  {:>6} {:>6}", m.tn(), m.fp())?;
    writeln!(out, "  {:>6} {:>6}", m.fn_(), m.tp())?;

    match model.feature_importance() {
        Ok(weights) => {
            writeln!(out, "Coefficients:")?;
            for w in weights {
                writeln!(out, "  {:<10}{:>9.4}", w.feature, w.coefficient)?;
            }
        }
        Err(e) => writeln!(out, "Coefficients: not applicable ({e})")?,
    }
    Ok(())
}
