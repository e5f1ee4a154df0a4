//! Turn each feature store into searchable statistical summaries

use super::feature_table::{fmt1, max, mean, median, min, percent, quantile, FeatureTable};
use crate::domain::KnowledgeIndex;

/// A feature store file and the generator that summarises it
#[derive(Debug, Clone, Copy)]
pub struct DatasetSource {
    pub file: &'static str,
    pub generate: fn(&mut KnowledgeIndex, &FeatureTable),
}

pub const DATASETS: [DatasetSource; 5] = [
    DatasetSource {
        file: "gym_exercise_features.json",
        generate: gym_exercise,
    },
    DatasetSource {
        file: "daily_gym_features.json",
        generate: daily_attendance,
    },
    DatasetSource {
        file: "body_perf_features.json",
        generate: body_performance,
    },
    DatasetSource {
        file: "calories_exercise_features.json",
        generate: calories,
    },
    DatasetSource {
        file: "fitbit_daily_features.json",
        generate: fitbit,
    },
];

fn avg(t: &FeatureTable, column: &str) -> String {
    fmt1(mean(&t.numbers(column)))
}

fn lowest(t: &FeatureTable, column: &str) -> String {
    fmt1(min(&t.numbers(column)))
}

fn highest(t: &FeatureTable, column: &str) -> String {
    fmt1(max(&t.numbers(column)))
}

fn mid(t: &FeatureTable, column: &str) -> String {
    fmt1(median(&t.numbers(column)))
}

/// Join the non-empty sentences of a document
fn join(parts: Vec<String>) -> String {
    parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn experience_label(level: f64) -> String {
    match level as i64 {
        1 => "Beginner".to_string(),
        2 => "Intermediate".to_string(),
        3 => "Advanced".to_string(),
        _ => format!("Level {}", level),
    }
}

fn day_name(day: f64) -> Option<&'static str> {
    const DAYS: [&str; 7] = [
        "Monday",
        "Tuesday",
        "Wednesday",
        "Thursday",
        "Friday",
        "Saturday",
        "Sunday",
    ];
    if day.fract() != 0.0 || day < 0.0 {
        return None;
    }
    DAYS.get(day as usize).copied()
}

pub fn gym_exercise(index: &mut KnowledgeIndex, df: &FeatureTable) {
    const CATEGORY: &str = "gym_exercise";
    let n = df.len();

    let age = df.column(&["age"]);
    let weight = df.column(&["weight_(kg)", "weight_kg", "weight"]);
    let calories = df.column(&["calories_burned"]);
    let duration = df.column(&["session_duration_(hours)", "session_duration_hours"]);
    let workout_type = df.column(&["workout_type"]);
    let bmi = df.column(&["bmi"]);
    let fat = df.column(&["fat_percentage"]);
    let experience = df.column(&["experience_level"]);
    let heart_rate = df.column(&["avg_bpm"]);
    let water = df.column(&["water_intake_(liters)", "water_intake_liters"]);

    index.add(
        join(vec![
            format!("The gym exercise tracking dataset contains {} recorded workout sessions from gym members.", n),
            "This data captures demographics, biometrics, and workout performance for each session.".to_string(),
            age.as_deref().map_or_else(String::new, |c| {
                format!(
                    "Member ages range from {} to {} years (average {}).",
                    lowest(df, c),
                    highest(df, c),
                    avg(df, c)
                )
            }),
            weight.as_deref().map_or_else(String::new, |c| {
                format!("Average body weight is {} kg.", avg(df, c))
            }),
            bmi.as_deref()
                .map_or_else(String::new, |c| format!("Average BMI is {}.", avg(df, c))),
        ]),
        CATEGORY,
        "overview",
    );

    if let Some(ref wtype) = workout_type {
        for (key, group) in df.group_by(wtype) {
            let mut parts = vec![format!(
                "Workout type '{}': {} sessions ({}% of total).",
                key,
                group.len(),
                percent(group.len(), n)
            )];
            if let Some(ref c) = calories {
                parts.push(format!(
                    "Average calories burned: {} kcal (range {}-{}).",
                    avg(&group, c),
                    lowest(&group, c),
                    highest(&group, c)
                ));
            }
            if let Some(ref c) = duration {
                parts.push(format!("Average session duration: {} hours.", avg(&group, c)));
            }
            if let Some(ref c) = heart_rate {
                parts.push(format!("Average heart rate: {} BPM.", avg(&group, c)));
            }
            if let Some(ref c) = age {
                parts.push(format!("Average member age: {} years.", avg(&group, c)));
            }
            if let Some(ref c) = experience {
                parts.push(format!(
                    "Average experience level: {} (1=beginner, 2=intermediate, 3=advanced).",
                    avg(&group, c)
                ));
            }
            index.add(join(parts), CATEGORY, format!("workout_{}", key));
        }
    }

    if let Some(ref c) = calories {
        let correlation = if duration.is_some() && heart_rate.is_some() {
            "Higher calorie burns correlate with longer session durations and higher heart rates."
        } else {
            ""
        };
        index.add(
            join(vec![
                format!(
                    "Calorie burn statistics across all workouts: average {} kcal per session, minimum {} kcal, maximum {} kcal, median {} kcal.",
                    avg(df, c),
                    lowest(df, c),
                    highest(df, c),
                    mid(df, c)
                ),
                correlation.to_string(),
            ]),
            CATEGORY,
            "calories",
        );
    }

    if let Some(ref exp) = experience {
        for (key, group) in df.group_by(exp) {
            let Some(level) = key.as_number() else {
                continue;
            };
            let mut parts = vec![format!(
                "{} members ({} sessions, {}%):",
                experience_label(level),
                group.len(),
                percent(group.len(), n)
            )];
            if let Some(ref c) = calories {
                parts.push(format!("avg calories {},", avg(&group, c)));
            }
            if let Some(ref c) = fat {
                parts.push(format!("avg body fat {}%,", avg(&group, c)));
            }
            if let Some(ref c) = water {
                parts.push(format!("avg water intake {} liters.", avg(&group, c)));
            }
            index.add(join(parts), CATEGORY, format!("experience_{}", key));
        }
    }

    if let Some(ref c) = bmi {
        index.add(
            format!(
                "BMI distribution: average {}, min {}, max {}. Underweight (<18.5): {} members, Normal (18.5-25): {} members, Overweight (25-30): {} members, Obese (30+): {} members.",
                avg(df, c),
                lowest(df, c),
                highest(df, c),
                df.count(c, |v| v < 18.5),
                df.count(c, |v| (18.5..25.0).contains(&v)),
                df.count(c, |v| (25.0..30.0).contains(&v)),
                df.count(c, |v| v >= 30.0),
            ),
            CATEGORY,
            "bmi",
        );
    }

    if let Some(ref c) = water {
        index.add(
            format!(
                "Water intake across members: average {} liters per day. Range: {} to {} liters. Recommended hydration is 2.5-3.5 liters for active gym members.",
                avg(df, c),
                lowest(df, c),
                highest(df, c)
            ),
            CATEGORY,
            "hydration",
        );
    }
}

pub fn daily_attendance(index: &mut KnowledgeIndex, df: &FeatureTable) {
    const CATEGORY: &str = "daily_attendance";
    let n = df.len();

    let age = df.column(&["age"]);
    let membership = df.column(&["membership_type"]);
    let duration = df.column(&["workout_duration_minutes", "workout_duration_(min)"]);
    let calories = df.column(&["calories_burned"]);
    let adherence = df.column(&["adherence_score"]);
    let churn = df.column(&["churn_risk"]);
    let weekday = df.column(&["day_of_week"]);

    index.add(
        join(vec![
            format!(
                "The daily gym attendance dataset has {} visit records capturing member check-ins, workout details, and attendance patterns.",
                n
            ),
            age.as_deref().map_or_else(String::new, |c| {
                format!("Member ages range from {} to {}.", lowest(df, c), highest(df, c))
            }),
            duration.as_deref().map_or_else(String::new, |c| {
                format!("Average workout duration is {} minutes.", avg(df, c))
            }),
        ]),
        CATEGORY,
        "overview",
    );

    if let Some(ref mem) = membership {
        for (key, group) in df.group_by(mem) {
            let mut parts = vec![format!(
                "Membership type '{}': {} visits ({}%).",
                key,
                group.len(),
                percent(group.len(), n)
            )];
            if let Some(ref c) = duration {
                parts.push(format!("Avg workout duration: {} min.", avg(&group, c)));
            }
            if let Some(ref c) = calories {
                parts.push(format!("Avg calories burned: {}.", avg(&group, c)));
            }
            if let Some(ref c) = adherence {
                parts.push(format!("Avg adherence score: {}.", avg(&group, c)));
            }
            index.add(join(parts), CATEGORY, format!("membership_{}", key));
        }
    }

    if let Some(ref dow) = weekday {
        let mut parts = vec!["Gym attendance by day of week:".to_string()];
        for (key, group) in df.group_by(dow) {
            let name = key
                .as_number()
                .and_then(day_name)
                .map_or_else(|| key.to_string(), str::to_string);
            parts.push(format!(
                "{}: {} visits ({}%)",
                name,
                group.len(),
                percent(group.len(), n)
            ));
        }
        index.add(format!("{}.", parts.join(" ")), CATEGORY, "day_patterns");
    }

    if let Some(ref c) = churn {
        let at_risk = df.filter(c, |v| v == 1.0);
        let stable = df.filter(c, |v| v == 0.0);
        let comparison = adherence.as_deref().map_or_else(String::new, |a| {
            format!(
                "At-risk members have an average adherence score of {} vs {} for stable members.",
                avg(&at_risk, a),
                avg(&stable, a)
            )
        });
        index.add(
            join(vec![
                format!(
                    "Churn risk analysis: {} members ({}%) flagged as at-risk for leaving the gym.",
                    at_risk.len(),
                    percent(at_risk.len(), n)
                ),
                format!(
                    "{} members ({}%) have healthy attendance patterns.",
                    stable.len(),
                    percent(stable.len(), n)
                ),
                comparison,
            ]),
            CATEGORY,
            "churn",
        );
    }
}

pub fn body_performance(index: &mut KnowledgeIndex, df: &FeatureTable) {
    const CATEGORY: &str = "body_performance";
    let n = df.len();

    let age = df.column(&["age"]);
    let class = df.column(&["class"]);
    let grip = df.column(&["gripforce"]);
    let situps = df.column(&["sit_ups_counts", "sit-ups_counts"]);
    let jump = df.column(&["broad_jump_cm"]);
    let bend = df.column(&["sit_and_bend_forward_cm"]);
    let fat = df.column(&["body_fat_", "body_fat_%", "body fat_%"]);
    let score = df.column(&["performance_score"]);
    let systolic = df.column(&["systolic"]);
    let diastolic = df.column(&["diastolic"]);

    index.add(
        join(vec![
            format!("The body performance dataset contains {} physical fitness assessments.", n),
            age.as_deref().map_or_else(String::new, |c| {
                format!("Age range: {}-{} years.", lowest(df, c), highest(df, c))
            }),
            "Metrics include grip force, sit-ups, broad jump, flexibility, blood pressure, and body fat percentage.".to_string(),
            if class.is_some() {
                "Performance is classified into classes (A=excellent through D=needs improvement).".to_string()
            } else {
                String::new()
            },
        ]),
        CATEGORY,
        "overview",
    );

    if let Some(ref cls) = class {
        for (key, group) in df.group_by(cls) {
            let mut parts = vec![format!(
                "Performance class '{}' ({} members, {}%):",
                key,
                group.len(),
                percent(group.len(), n)
            )];
            if let Some(ref c) = grip {
                parts.push(format!("avg grip force {} kg,", avg(&group, c)));
            }
            if let Some(ref c) = situps {
                parts.push(format!("avg sit-ups {},", avg(&group, c)));
            }
            if let Some(ref c) = jump {
                parts.push(format!("avg broad jump {} cm,", avg(&group, c)));
            }
            if let Some(ref c) = bend {
                parts.push(format!("avg flexibility {} cm,", avg(&group, c)));
            }
            if let Some(ref c) = fat {
                parts.push(format!("avg body fat {}%,", avg(&group, c)));
            }
            if let (Some(s), Some(d)) = (&systolic, &diastolic) {
                parts.push(format!(
                    "avg blood pressure {}/{} mmHg.",
                    avg(&group, s),
                    avg(&group, d)
                ));
            }
            index.add(join(parts), CATEGORY, format!("class_{}", key));
        }
    }

    if let Some(ref c) = score {
        let values = df.numbers(c);
        if let (Some(q25), Some(q50), Some(q75)) = (
            quantile(&values, 0.25),
            quantile(&values, 0.50),
            quantile(&values, 0.75),
        ) {
            index.add(
                format!(
                    "Performance score distribution: 25th percentile = {:.2}, median = {:.2}, 75th percentile = {:.2}. Scores above {:.2} indicate elite fitness. Below {:.2} suggests significant room for improvement.",
                    q25, q50, q75, q75, q25
                ),
                CATEGORY,
                "performance_dist",
            );
        }
    }

    if let (Some(s), Some(d)) = (&systolic, &diastolic) {
        index.add(
            format!(
                "Blood pressure across members: average systolic {} mmHg, average diastolic {} mmHg. Normal: < 120/80. Elevated: 120-129/<80. High Stage 1: 130-139/80-89. High Stage 2: 140+/90+.",
                avg(df, s),
                avg(df, d)
            ),
            CATEGORY,
            "blood_pressure",
        );
    }
}

pub fn calories(index: &mut KnowledgeIndex, df: &FeatureTable) {
    const CATEGORY: &str = "calories";
    let n = df.len();

    let duration = df.column(&["duration"]);
    let heart_rate = df.column(&["heart_rate"]);
    let burned = df.column(&["calories"]);

    index.add(
        join(vec![
            format!(
                "The calorie burning dataset contains {} exercise records with heart rate, duration, body temperature, and calories burned.",
                n
            ),
            duration.as_deref().map_or_else(String::new, |c| {
                format!(
                    "Duration ranges from {} to {} minutes (avg {}).",
                    lowest(df, c),
                    highest(df, c),
                    avg(df, c)
                )
            }),
            burned.as_deref().map_or_else(String::new, |c| {
                format!("Average calories burned: {} kcal.", avg(df, c))
            }),
            heart_rate.as_deref().map_or_else(String::new, |c| {
                format!("Average heart rate during exercise: {} BPM.", avg(df, c))
            }),
        ]),
        CATEGORY,
        "overview",
    );

    let Some(ref cal) = burned else {
        return;
    };

    if let Some(ref dur) = duration {
        let buckets = [
            (0.0, 10.0, "short (0-10 min)"),
            (10.0, 20.0, "medium (10-20 min)"),
            (20.0, 30.0, "long (20-30 min)"),
        ];
        for (lo, hi, label) in buckets {
            let group = df.filter(dur, |v| v >= lo && v < hi);
            if group.is_empty() {
                continue;
            }
            let hr = heart_rate
                .as_deref()
                .map_or_else(|| "N/A".to_string(), |c| avg(&group, c));
            index.add(
                format!(
                    "For {} exercises ({} records): average calorie burn is {} kcal, average heart rate {} BPM.",
                    label,
                    group.len(),
                    avg(&group, cal),
                    hr
                ),
                CATEGORY,
                format!("duration_{}", label),
            );
        }
    }

    if let Some(ref hr) = heart_rate {
        let zones = [(60.0, 100.0, "light"), (100.0, 140.0, "moderate"), (140.0, 200.0, "vigorous")];
        for (lo, hi, zone) in zones {
            let group = df.filter(hr, |v| v >= lo && v < hi);
            if group.is_empty() {
                continue;
            }
            let minutes = duration
                .as_deref()
                .map_or_else(|| "N/A".to_string(), |c| avg(&group, c));
            index.add(
                format!(
                    "Heart rate zone '{}' ({}-{} BPM, {} records): average calorie burn {} kcal over {} min average duration.",
                    zone,
                    lo,
                    hi,
                    group.len(),
                    avg(&group, cal),
                    minutes
                ),
                CATEGORY,
                format!("hr_zone_{}", zone),
            );
        }
    }
}

pub fn fitbit(index: &mut KnowledgeIndex, df: &FeatureTable) {
    const CATEGORY: &str = "fitbit";
    let n = df.len();

    let steps = df.column(&["totalsteps"]);
    let calories = df.column(&["calories"]);
    let sedentary = df.column(&["sedentaryminutes"]);

    index.add(
        join(vec![
            format!(
                "Fitbit wearable data: {} daily activity records from gym members' fitness trackers.",
                n
            ),
            steps.as_deref().map_or_else(String::new, |c| {
                format!("Average daily steps: {}.", avg(df, c))
            }),
            calories.as_deref().map_or_else(String::new, |c| {
                format!("Average daily calories: {} kcal.", avg(df, c))
            }),
            sedentary.as_deref().map_or_else(String::new, |c| {
                format!("Average sedentary minutes: {} min/day.", avg(df, c))
            }),
        ]),
        CATEGORY,
        "overview",
    );

    if let Some(ref c) = steps {
        let active = df.count(c, |v| v > 10_000.0);
        let inactive = df.count(c, |v| v < 5_000.0);
        index.add(
            format!(
                "Daily step count: average {}, min {}, max {}. WHO recommends 8000-10000 steps/day. Members above 10000 steps: {} ({}%). Members below 5000 steps (sedentary): {} ({}%).",
                avg(df, c),
                lowest(df, c),
                highest(df, c),
                active,
                percent(active, n),
                inactive,
                percent(inactive, n)
            ),
            CATEGORY,
            "steps",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn table(value: Value) -> FeatureTable {
        FeatureTable::from_records(serde_json::from_value(value).unwrap())
    }

    fn sources(index: &KnowledgeIndex) -> Vec<&str> {
        index.documents().iter().map(|d| d.source()).collect()
    }

    #[test]
    fn test_gym_exercise_documents() {
        let df = table(json!([
            {"Age": 25, "Workout_Type": "Cardio", "Calories_Burned": 400.0, "Experience_Level": 1, "BMI": 22.0, "Water_Intake (liters)": 2.5},
            {"Age": 35, "Workout_Type": "Strength", "Calories_Burned": 600.0, "Experience_Level": 3, "BMI": 31.0, "Water_Intake (liters)": 3.5},
            {"Age": 45, "Workout_Type": "Cardio", "Calories_Burned": 500.0, "Experience_Level": 1, "BMI": 17.0, "Water_Intake (liters)": 3.0}
        ]));
        let mut index = KnowledgeIndex::new();
        gym_exercise(&mut index, &df);

        assert_eq!(
            sources(&index),
            vec![
                "overview",
                "workout_Cardio",
                "workout_Strength",
                "calories",
                "experience_1",
                "experience_3",
                "bmi",
                "hydration"
            ]
        );
        let docs = index.documents();
        assert!(docs[0].text().contains("contains 3 recorded workout sessions"));
        assert!(docs[0].text().contains("Member ages range from 25.0 to 45.0 years (average 35.0)."));
        assert_eq!(
            docs[1].text(),
            "Workout type 'Cardio': 2 sessions (66.7% of total). Average calories burned: 450.0 kcal (range 400.0-500.0). Average member age: 35.0 years. Average experience level: 1.0 (1=beginner, 2=intermediate, 3=advanced)."
        );
        assert!(docs[4].text().starts_with("Beginner members (2 sessions, 66.7%):"));
        assert!(docs[6].text().contains("Underweight (<18.5): 1 members"));
        assert!(docs[6].text().contains("Obese (30+): 1 members."));
        assert!(docs.iter().all(|d| d.category() == "gym_exercise"));
    }

    #[test]
    fn test_missing_columns_only_produce_overview() {
        let df = table(json!([{"unrelated": 1}, {"unrelated": 2}]));
        let mut index = KnowledgeIndex::new();
        gym_exercise(&mut index, &df);
        assert_eq!(sources(&index), vec!["overview"]);
    }

    #[test]
    fn test_daily_attendance_documents() {
        let df = table(json!([
            {"membership_type": "Premium", "day_of_week": 0, "churn_risk": 0, "adherence_score": 0.9},
            {"membership_type": "Basic", "day_of_week": 0, "churn_risk": 1, "adherence_score": 0.3},
            {"membership_type": "Basic", "day_of_week": 6, "churn_risk": 0, "adherence_score": 0.7}
        ]));
        let mut index = KnowledgeIndex::new();
        daily_attendance(&mut index, &df);

        assert_eq!(
            sources(&index),
            vec!["overview", "membership_Basic", "membership_Premium", "day_patterns", "churn"]
        );
        let docs = index.documents();
        assert_eq!(
            docs[3].text(),
            "Gym attendance by day of week: Monday: 2 visits (66.7%) Sunday: 1 visits (33.3%)."
        );
        assert!(docs[4].text().starts_with("Churn risk analysis: 1 members (33.3%)"));
        assert!(docs[4].text().contains("adherence score of 0.3 vs 0.8"));
    }

    #[test]
    fn test_body_performance_documents() {
        let df = table(json!([
            {"class": "A", "gripforce": 50.0, "systolic": 120, "diastolic": 80, "performance_score": 1.0},
            {"class": "B", "gripforce": 40.0, "systolic": 130, "diastolic": 85, "performance_score": 2.0},
            {"class": "A", "gripforce": 46.0, "systolic": 110, "diastolic": 70, "performance_score": 3.0}
        ]));
        let mut index = KnowledgeIndex::new();
        body_performance(&mut index, &df);

        assert_eq!(
            sources(&index),
            vec!["overview", "class_A", "class_B", "performance_dist", "blood_pressure"]
        );
        let docs = index.documents();
        assert!(docs[1].text().contains("avg grip force 48.0 kg,"));
        assert!(docs[1].text().contains("avg blood pressure 115.0/75.0 mmHg."));
        assert!(docs[3].text().starts_with(
            "Performance score distribution: 25th percentile = 1.50, median = 2.00, 75th percentile = 2.50."
        ));
    }

    #[test]
    fn test_calories_buckets_and_zones() {
        let df = table(json!([
            {"duration": 5.0, "heart_rate": 90.0, "calories": 20.0},
            {"duration": 15.0, "heart_rate": 105.0, "calories": 80.0},
            {"duration": 25.0, "heart_rate": 120.0, "calories": 160.0}
        ]));
        let mut index = KnowledgeIndex::new();
        calories(&mut index, &df);

        assert_eq!(
            sources(&index),
            vec![
                "overview",
                "duration_short (0-10 min)",
                "duration_medium (10-20 min)",
                "duration_long (20-30 min)",
                "hr_zone_light",
                "hr_zone_moderate"
            ]
        );
        assert_eq!(
            index.documents()[5].text(),
            "Heart rate zone 'moderate' (100-140 BPM, 2 records): average calorie burn 120.0 kcal over 20.0 min average duration."
        );
    }

    #[test]
    fn test_fitbit_steps() {
        let df = table(json!([
            {"TotalSteps": 12000, "Calories": 2500},
            {"TotalSteps": 3000, "Calories": 1800},
            {"TotalSteps": 7000, "Calories": 2100},
            {"TotalSteps": null, "Calories": 2000}
        ]));
        let mut index = KnowledgeIndex::new();
        fitbit(&mut index, &df);

        assert_eq!(sources(&index), vec!["overview", "steps"]);
        let steps = index.documents()[1].text();
        assert!(steps.contains("average 7333.3, min 3000.0, max 12000.0."));
        assert!(steps.contains("Members above 10000 steps: 1 (25.0%)."));
        assert!(steps.contains("Members below 5000 steps (sedentary): 1 (25.0%)."));
    }

    #[test]
    fn test_dataset_files_are_distinct() {
        let mut files: Vec<&str> = DATASETS.iter().map(|d| d.file).collect();
        files.sort();
        files.dedup();
        assert_eq!(files.len(), 5);
    }
}
