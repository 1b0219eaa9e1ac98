//! Aggregate counts shown on the dashboard.
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::{Idea, Status};

/// Counts derived from the full idea list at a given instant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub total_ideas: usize,
    pub drafts: usize,
    pub in_review: usize,
    pub ready: usize,
    pub published: usize,
    /// Ideas created in the last 7 days
    pub this_week: usize,
    /// Ideas created in the last 30 days
    pub this_month: usize,
}

impl Metrics {
    /// Computes the metrics for `ideas` as seen at `now`.
    ///
    /// Ideas whose `created_at` cannot be parsed count toward neither window.
    pub fn compute(ideas: &[Idea], now: DateTime<Utc>) -> Self {
        let week_ago = now - Duration::days(7);
        let month_ago = now - Duration::days(30);

        let mut metrics = Metrics {
            total_ideas: ideas.len(),
            ..Metrics::default()
        };

        for idea in ideas {
            match idea.status {
                Status::Draft => metrics.drafts += 1,
                Status::Review => metrics.in_review += 1,
                Status::Ready => metrics.ready += 1,
                Status::Published => metrics.published += 1,
            }

            if let Some(created) = idea.created_instant() {
                if created >= week_ago {
                    metrics.this_week += 1;
                }
                if created >= month_ago {
                    metrics.this_month += 1;
                }
            }
        }

        metrics
    }

    pub fn count_for(&self, status: Status) -> usize {
        match status {
            Status::Draft => self.drafts,
            Status::Review => self.in_review,
            Status::Ready => self.ready,
            Status::Published => self.published,
        }
    }

    /// Share of all ideas in `status`, as a whole percentage
    pub fn percentage_for(&self, status: Status) -> usize {
        if self.total_ideas == 0 {
            return 0;
        }
        (self.count_for(status) * 100 + self.total_ideas / 2) / self.total_ideas
    }
}

/// Ideas created on each of the `days` calendar days (UTC) ending with `today`, oldest first
pub fn daily_activity(ideas: &[Idea], today: NaiveDate, days: u32) -> Vec<(NaiveDate, usize)> {
    (0..days)
        .rev()
        .map(|offset| {
            let day = today - Duration::days(i64::from(offset));
            let count = ideas
                .iter()
                .filter(|idea| idea.created_instant().map(|c| c.date_naive()) == Some(day))
                .count();
            (day, count)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format_timestamp;

    fn idea_created(status: Status, created: DateTime<Utc>) -> Idea {
        let mut idea = Idea::new("t".into(), "c".into(), vec![]).with_status(status);
        idea.created_at = format_timestamp(created);
        idea.updated_at = idea.created_at.clone();
        idea
    }

    #[test]
    fn empty_list_yields_zeroes() {
        assert_eq!(Metrics::compute(&[], Utc::now()), Metrics::default());
    }

    #[test]
    fn counts_statuses_and_windows() {
        let now = Utc::now();
        let ideas = vec![
            idea_created(Status::Draft, now - Duration::days(1)),
            idea_created(Status::Draft, now - Duration::days(10)),
            idea_created(Status::Review, now - Duration::days(40)),
            idea_created(Status::Published, now),
        ];

        let metrics = Metrics::compute(&ideas, now);
        assert_eq!(metrics.total_ideas, 4);
        assert_eq!(metrics.drafts, 2);
        assert_eq!(metrics.in_review, 1);
        assert_eq!(metrics.ready, 0);
        assert_eq!(metrics.published, 1);
        assert_eq!(metrics.this_week, 2);
        assert_eq!(metrics.this_month, 3);
    }

    #[test]
    fn unparseable_dates_are_outside_every_window() {
        let mut idea = Idea::new("t".into(), "c".into(), vec![]);
        idea.created_at = "sometime".into();

        let metrics = Metrics::compute(&[idea], Utc::now());
        assert_eq!(metrics.total_ideas, 1);
        assert_eq!(metrics.this_week, 0);
        assert_eq!(metrics.this_month, 0);
    }

    #[test]
    fn percentages_round_to_nearest() {
        let metrics = Metrics {
            total_ideas: 3,
            drafts: 2,
            in_review: 1,
            ..Metrics::default()
        };
        assert_eq!(metrics.percentage_for(Status::Draft), 67);
        assert_eq!(metrics.percentage_for(Status::Review), 33);
        assert_eq!(metrics.percentage_for(Status::Ready), 0);
    }

    #[test]
    fn daily_activity_buckets_by_creation_day() {
        let now = Utc::now();
        let today = now.date_naive();
        let ideas = vec![
            idea_created(Status::Draft, now),
            idea_created(Status::Review, now),
            idea_created(Status::Draft, now - Duration::days(2)),
            idea_created(Status::Draft, now - Duration::days(9)),
        ];

        let activity = daily_activity(&ideas, today, 7);
        assert_eq!(activity.len(), 7);
        assert_eq!(activity[6], (today, 2));
        assert_eq!(activity[4], (today - Duration::days(2), 1));
        assert_eq!(activity[0].0, today - Duration::days(6));
        assert_eq!(activity.iter().map(|(_, n)| n).sum::<usize>(), 3);
    }
}
