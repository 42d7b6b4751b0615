use crate::insights::types::{
    LearningRecommendation, Priority, RecommendationType, SubjectPerformance, Trend,
};

const WEAKNESS_SCORE: f64 = 75.0;
const HIGH_PRIORITY_SCORE: f64 = 70.0;
const EXCELLENCE_SCORE: f64 = 85.0;
const LOW_CONSISTENCY: f64 = 50.0;
const SLOW_VELOCITY: f64 = 0.1;
const MOTIVATION_SCORE: f64 = 80.0;

pub const MULTIPLE_SUBJECTS: &str = "Multiple Subjects";

fn recommendation(
    kind: RecommendationType,
    priority: Priority,
    subject: &str,
    title: String,
    description: String,
    action: String,
) -> LearningRecommendation {
    LearningRecommendation {
        id: uuid::Uuid::new_v4().to_string(),
        title,
        description,
        priority,
        subject: subject.to_string(),
        action,
        kind,
    }
}

fn subject_recommendations(perf: &SubjectPerformance) -> Vec<LearningRecommendation> {
    let subject = perf.subject.as_str();
    let mut out = Vec::new();

    if perf.trend == Trend::Down || perf.current_score < WEAKNESS_SCORE {
        let priority = if perf.current_score < HIGH_PRIORITY_SCORE {
            Priority::High
        } else {
            Priority::Medium
        };
        out.push(recommendation(
            RecommendationType::Weakness,
            priority,
            subject,
            format!("Focus on {subject}"),
            format!(
                "Your recent average in {subject} is {}%. Targeted revision will help close the gap.",
                perf.current_score
            ),
            format!("Practice {subject} problems for 30 minutes daily"),
        ));
    } else if perf.trend == Trend::Up && perf.current_score >= EXCELLENCE_SCORE {
        out.push(recommendation(
            RecommendationType::Maintenance,
            Priority::Low,
            subject,
            format!("Maintain Excellence in {subject}"),
            format!(
                "You are improving steadily in {subject} with a recent average of {}%.",
                perf.current_score
            ),
            format!("Try advanced {subject} problems to stay challenged"),
        ));
    }

    if perf.consistency_index < LOW_CONSISTENCY {
        out.push(recommendation(
            RecommendationType::Improvement,
            Priority::Medium,
            subject,
            format!("Improve Consistency in {subject}"),
            format!("Your {subject} scores vary a lot between assessments."),
            format!("Review {subject} regularly instead of just before tests"),
        ));
    }

    if perf.learning_velocity < SLOW_VELOCITY && perf.current_score < MOTIVATION_SCORE {
        out.push(recommendation(
            RecommendationType::Motivation,
            Priority::High,
            subject,
            format!("Boost Progress in {subject}"),
            format!(
                "Progress in {subject} has stalled at {} points per day.",
                perf.learning_velocity
            ),
            format!("Set a small weekly goal for {subject} and track it"),
        ));
    }

    out
}

fn weak_topic_recommendation(topic: &str) -> LearningRecommendation {
    recommendation(
        RecommendationType::Weakness,
        Priority::High,
        MULTIPLE_SUBJECTS,
        format!("Strengthen {topic}"),
        format!("Your average on {topic} is below the passing level."),
        format!("Revisit the fundamentals of {topic} and attempt practice questions"),
    )
}

fn study_schedule_recommendation() -> LearningRecommendation {
    recommendation(
        RecommendationType::Improvement,
        Priority::Medium,
        "General",
        "Consistent Study Schedule".to_string(),
        "Keep a regular study routine to sustain your progress.".to_string(),
        "Plan fixed study hours for each day of the week".to_string(),
    )
}

/// Rule cascade per subject, then one entry per weak topic.
/// Never returns an empty list.
pub fn generate_recommendations(
    subjects: &[SubjectPerformance],
    weak_topics: &[String],
) -> Vec<LearningRecommendation> {
    let mut out: Vec<LearningRecommendation> =
        subjects.iter().flat_map(subject_recommendations).collect();
    out.extend(weak_topics.iter().map(|t| weak_topic_recommendation(t)));

    if out.is_empty() {
        out.push(study_schedule_recommendation());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perf(current: f64, previous: f64, trend: Trend, consistency: f64, velocity: f64) -> SubjectPerformance {
        SubjectPerformance {
            subject: "Math".to_string(),
            current_score: current,
            previous_score: previous,
            trend,
            color: String::new(),
            consistency_index: consistency,
            learning_velocity: velocity,
        }
    }

    fn kinds(recs: &[LearningRecommendation]) -> Vec<(RecommendationType, Priority)> {
        recs.iter().map(|r| (r.kind, r.priority)).collect()
    }

    #[test]
    fn excellent_improving_subject_gets_maintenance() {
        let recs = generate_recommendations(&[perf(89.0, 70.0, Trend::Up, 93.84, 0.5)], &[]);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].title, "Maintain Excellence in Math");
        assert_eq!(recs[0].priority, Priority::Low);
        assert_eq!(recs[0].kind, RecommendationType::Maintenance);
    }

    #[test]
    fn weakness_priority_depends_on_score() {
        let high = generate_recommendations(&[perf(65.0, 66.0, Trend::Stable, 90.0, 1.0)], &[]);
        assert_eq!(kinds(&high), vec![(RecommendationType::Weakness, Priority::High)]);

        let medium = generate_recommendations(&[perf(72.0, 73.0, Trend::Stable, 90.0, 1.0)], &[]);
        assert_eq!(kinds(&medium), vec![(RecommendationType::Weakness, Priority::Medium)]);

        let declining = generate_recommendations(&[perf(88.0, 95.0, Trend::Down, 90.0, 1.0)], &[]);
        assert_eq!(kinds(&declining), vec![(RecommendationType::Weakness, Priority::Medium)]);
    }

    #[test]
    fn later_rules_stack_on_earlier_ones() {
        let recs = generate_recommendations(&[perf(60.0, 80.0, Trend::Down, 20.0, -1.0)], &[]);
        assert_eq!(
            kinds(&recs),
            vec![
                (RecommendationType::Weakness, Priority::High),
                (RecommendationType::Improvement, Priority::Medium),
                (RecommendationType::Motivation, Priority::High),
            ]
        );
    }

    #[test]
    fn weak_topics_are_tagged_multiple_subjects() {
        let recs = generate_recommendations(&[], &["Fractions".to_string()]);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].subject, MULTIPLE_SUBJECTS);
        assert_eq!(recs[0].priority, Priority::High);
        assert_eq!(recs[0].kind, RecommendationType::Weakness);
    }

    #[test]
    fn empty_input_falls_back_to_schedule_advice() {
        let recs = generate_recommendations(&[], &[]);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].title, "Consistent Study Schedule");
        assert_eq!(recs[0].kind, RecommendationType::Improvement);

        // stable, solid subject triggers nothing either
        let stable = generate_recommendations(&[perf(80.0, 80.0, Trend::Stable, 90.0, 0.0)], &[]);
        assert_eq!(stable[0].title, "Consistent Study Schedule");
    }
}
