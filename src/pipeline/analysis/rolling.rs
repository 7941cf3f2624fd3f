use crate::domain::{MonthlyTotal, RollingTotal};

/// Left-to-right prefix sum over a month-ordered series.
///
/// The input order is taken as given; callers pass the output of
/// [`MonthlyAggregator`](super::monthly::MonthlyAggregator), which is already
/// ascending by month.
#[derive(Debug, Clone, Default)]
pub struct RollingTotalComputer;

impl RollingTotalComputer {
    pub fn new() -> Self {
        Self
    }

    pub fn compute(&self, monthly: &[MonthlyTotal]) -> Vec<RollingTotal> {
        let mut running_total = 0u64;
        monthly
            .iter()
            .map(|m| {
                running_total = running_total.saturating_add(m.total);
                RollingTotal {
                    month: m.month,
                    total: m.total,
                    running_total,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::YearMonth;

    fn monthly(series: &[((i32, u32), u64)]) -> Vec<MonthlyTotal> {
        series
            .iter()
            .map(|&((year, month), total)| MonthlyTotal {
                month: YearMonth::new(year, month),
                total,
            })
            .collect()
    }

    #[test]
    fn test_running_totals() {
        let input = monthly(&[((2023, 1), 10), ((2023, 2), 5), ((2023, 3), 0)]);

        let rolling = RollingTotalComputer::new().compute(&input);

        let running: Vec<u64> = rolling.iter().map(|r| r.running_total).collect();
        assert_eq!(running, vec![10, 15, 15]);
        assert_eq!(rolling[1].month.to_string(), "2023-02");
        assert_eq!(rolling[1].total, 5);
    }

    #[test]
    fn test_input_order_is_not_changed() {
        let input = monthly(&[((2023, 3), 1), ((2023, 1), 2)]);

        let rolling = RollingTotalComputer::new().compute(&input);

        assert_eq!(rolling[0].month, YearMonth::new(2023, 3));
        assert_eq!(rolling[1].running_total, 3);
    }

    #[test]
    fn test_running_total_saturates() {
        let input = monthly(&[((2023, 1), u64::MAX), ((2023, 2), 1)]);

        let rolling = RollingTotalComputer::new().compute(&input);

        assert_eq!(rolling[1].running_total, u64::MAX);
        assert_eq!(rolling[1].total, 1);
    }

    #[test]
    fn test_empty_series() {
        assert!(RollingTotalComputer::new().compute(&[]).is_empty());
    }
}
