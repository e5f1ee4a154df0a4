//! Static fitness knowledge so common questions always have context

use crate::domain::KnowledgeIndex;

const CATEGORY: &str = "fitness_knowledge";

pub const FITNESS_KNOWLEDGE: [&str; 12] = [
    "HIIT (High-Intensity Interval Training) alternates between intense bursts and rest periods. \
     Burns 400-600 calories in 30 minutes. Best for fat loss, cardiovascular fitness, and metabolic boost. \
     Recommended 2-3 times per week with rest days between sessions.",
    "Strength training builds muscle mass, increases bone density, and boosts metabolism. \
     For beginners: 3 sets of 8-12 reps. Intermediate: 4 sets of 6-10 reps. Advanced: 5+ sets with progressive overload. \
     Major compound exercises: squat, deadlift, bench press, overhead press, barbell row.",
    "Yoga improves flexibility, balance, and mental well-being. Burns 200-400 calories per hour. \
     Types: Hatha (beginner-friendly), Vinyasa (flow-based), Ashtanga (intense), Yin (passive stretching). \
     Recommended 2-4 times per week as active recovery or primary workout.",
    "Cardio exercise includes running, cycling, swimming, and elliptical training. \
     Zone 2 cardio (60-70% max heart rate) is optimal for fat burning and endurance building. \
     Max heart rate estimate: 220 minus age. Target 150-300 minutes of moderate cardio per week.",
    "For muscle building: consume 1.6-2.2g protein per kg bodyweight daily. \
     Caloric surplus of 200-500 kcal above maintenance for lean bulk. \
     Good protein sources: chicken breast (31g/100g), eggs (13g/100g), Greek yogurt (10g/100g), whey protein (80g/100g).",
    "For fat loss: create a caloric deficit of 300-500 kcal below maintenance. \
     Maintenance calories are roughly bodyweight (kg) x 30-33. \
     Prioritize protein (prevents muscle loss), eat fiber-rich foods for satiety, drink 2-3 liters of water daily.",
    "Rest and recovery are critical for progress. Muscles grow during rest, not during workouts. \
     Sleep 7-9 hours per night. Sleep deprivation reduces strength by 10-15% and increases injury risk. \
     Active recovery (light walking, stretching) is better than complete rest on off days.",
    "Progressive overload is the fundamental principle of fitness improvement. \
     Increase weight by 2-5% when you can complete all target reps with good form. \
     Alternatively: increase reps, sets, time under tension, or decrease rest periods. \
     Track your workouts to ensure progressive overload is happening.",
    "Heart rate training zones: Zone 1 (50-60% max HR) = very light warmup. \
     Zone 2 (60-70%) = fat burning, endurance. Zone 3 (70-80%) = aerobic capacity. \
     Zone 4 (80-90%) = anaerobic threshold, lactate. Zone 5 (90-100%) = maximum effort, sprint intervals.",
    "Common gym mistakes: not warming up (5-10 min dynamic stretching recommended), \
     skipping compound movements for isolation exercises, not tracking workouts, \
     overtraining without adequate rest, poor hydration, inconsistent attendance. \
     Consistency beats intensity: 3 good sessions per week outperforms 6 mediocre ones.",
    "Evidence-based supplements: creatine monohydrate (5g daily, well-researched for strength and power), \
     caffeine (3-6mg/kg bodyweight pre-workout for performance), whey protein (convenient protein source), \
     vitamin D (if deficient, common in indoor exercisers), omega-3 (anti-inflammatory, heart health).",
    "Body fat percentage categories. Men: Essential (2-5%), Athletes (6-13%), Fitness (14-17%), \
     Average (18-24%), Obese (25%+). Women: Essential (10-13%), Athletes (14-20%), \
     Fitness (21-24%), Average (25-31%), Obese (32%+).",
];

pub fn add_fitness_knowledge(index: &mut KnowledgeIndex) {
    for (i, chunk) in FITNESS_KNOWLEDGE.iter().enumerate() {
        index.add(*chunk, CATEGORY, format!("knowledge_{}", i));
    }
}
