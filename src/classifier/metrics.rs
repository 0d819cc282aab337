/// Rows are the true class, columns the predicted class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfusionMatrix {
    pub counts: [[usize; 2]; 2],
}

impl ConfusionMatrix {
    pub fn from_predictions(y_true: &[u8], y_pred: &[u8]) -> Self {
        let mut counts = [[0usize; 2]; 2];
        for (&t, &p) in y_true.iter().zip(y_pred) {
            counts[usize::from(t.min(1))][usize::from(p.min(1))] += 1;
        }
        Self { counts }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    fn support(&self, class: usize) -> usize {
        self.counts[class].iter().sum()
    }

    fn predicted(&self, class: usize) -> usize {
        self.counts[0][class] + self.counts[1][class]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    /// Indexed by class: `[0]` is ordinary, `[1]` is high expense.
    pub classes: [ClassMetrics; 2],
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

/// Per-class precision/recall/F1 plus accuracy and averages.
/// Undefined ratios (no predictions or no support) are reported as 0.0.
pub fn classification_report(cm: &ConfusionMatrix) -> ClassificationReport {
    let classes = [0usize, 1].map(|c| {
        let precision = ratio(cm.counts[c][c], cm.predicted(c));
        let recall = ratio(cm.counts[c][c], cm.support(c));
        ClassMetrics {
            precision,
            recall,
            f1: f1(precision, recall),
            support: cm.support(c),
        }
    });

    let total = cm.total();
    let accuracy = ratio(cm.counts[0][0] + cm.counts[1][1], total);

    let macro_avg = ClassMetrics {
        precision: (classes[0].precision + classes[1].precision) / 2.0,
        recall: (classes[0].recall + classes[1].recall) / 2.0,
        f1: (classes[0].f1 + classes[1].f1) / 2.0,
        support: total,
    };

    let w = [ratio(classes[0].support, total), ratio(classes[1].support, total)];
    let weighted_avg = ClassMetrics {
        precision: classes[0].precision * w[0] + classes[1].precision * w[1],
        recall: classes[0].recall * w[0] + classes[1].recall * w[1],
        f1: classes[0].f1 * w[0] + classes[1].f1 * w[1],
        support: total,
    };

    ClassificationReport {
        classes,
        accuracy,
        macro_avg,
        weighted_avg,
    }
}
