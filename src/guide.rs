// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Coaching instructions and tips per exercise.

use serde::Serialize;

use crate::utils::normalize_exercise;

/// Step-by-step instructions and form tips for one exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExerciseGuide {
    /// Ordered execution steps.
    pub instructions: &'static [&'static str],
    /// Common form cues.
    pub tips: &'static [&'static str],
}

const GENERIC: ExerciseGuide = ExerciseGuide {
    instructions: &["Follow your trainer's instructions"],
    tips: &["Always maintain correct form"],
};

/// Guide for an exercise; a generic guide for exercises without one.
#[must_use]
pub fn exercise_guide(exercise: &str) -> ExerciseGuide {
    match normalize_exercise(exercise).as_str() {
        "squat" => ExerciseGuide {
            instructions: &[
                "Feet shoulder-width apart, toes turned slightly out",
                "Descend by pushing your hips back and down",
                "Keep your weight on your heels",
                "Lower until your hips are below your knees",
                "Drive up through your heels",
            ],
            tips: &[
                "Keep your chest up throughout the movement",
                "Do not let your knees cave inwards",
                "Inhale on the way down, exhale on the way up",
            ],
        },
        "pushup" => ExerciseGuide {
            instructions: &[
                "Plank position with hands under your shoulders",
                "Body in a straight line from head to heels",
                "Lower yourself under control",
                "Bring your chest to the floor while holding your form",
                "Push up while keeping the body line",
            ],
            tips: &[
                "Brace your abs to hold the body line",
                "Do not let your hips drop",
                "Control both the descent and the ascent",
            ],
        },
        "lunge" => ExerciseGuide {
            instructions: &[
                "Feet hip-width apart, step forward",
                "Lower straight down",
                "Front knee at 90 degrees",
                "Back knee close to the floor",
                "Drive back up through your front heel",
            ],
            tips: &[
                "Your front knee should not pass your toes",
                "Keep your torso upright",
                "Spread your weight across both legs",
            ],
        },
        "plank" => ExerciseGuide {
            instructions: &[
                "Forearms on the floor, elbows under your shoulders",
                "Body in a straight line",
                "Squeeze your abs and glutes",
                "Hold the position while breathing normally",
            ],
            tips: &[
                "Do not raise your hips too high",
                "Keep your head in a neutral position",
                "Breathe steadily",
            ],
        },
        "burpee" => ExerciseGuide {
            instructions: &[
                "Squat and place your hands on the floor",
                "Jump back into a plank",
                "Optional push-up",
                "Jump your feet towards your hands",
                "Explosive jump upwards",
            ],
            tips: &[
                "Keep a steady rhythm",
                "Land softly on your feet",
                "Use your arms to drive the jump",
            ],
        },
        _ => GENERIC,
    }
}
