use rand::seq::SliceRandom;
use rand::Rng;

pub const CORRECT_MESSAGES: [&str; 7] = [
    "Excellent 🦄",
    "Very good 🎉",
    "You got it 😘",
    "You're doing great 👏",
    "We have a little genius here 🧠",
    "Correct 👏",
    "You'll go far 🚀",
];

pub const WRONG_MESSAGES: [&str; 7] = [
    "Almost 🙈",
    "No worries, try again 🤩",
    "It happens to everyone 🐵",
    "You can do it 👸",
    "I didn't know that one either 🙊",
    "Practice makes perfect 🤩",
    "Come on, don't give up 💪",
];

pub fn pick_feedback<R: Rng + ?Sized>(rng: &mut R, correct: bool) -> &'static str {
    let pool: &[&'static str] = if correct {
        &CORRECT_MESSAGES
    } else {
        &WRONG_MESSAGES
    };
    pool.choose(rng).copied().unwrap_or_default()
}

/// End-of-session headline for a score percentage.
pub fn congratulation(percentage: f64) -> &'static str {
    if percentage >= 100.0 {
        "You're a genius! Congratulations! 🌟🌟🌟"
    } else if percentage >= 75.0 {
        "Excellent! You learned it well! 🎉"
    } else if percentage >= 50.0 {
        "Good! Practice a little more! 👍"
    } else if percentage >= 25.0 {
        "Not bad! Try again! 🤗"
    } else {
        "Don't get discouraged! Try again! 💪"
    }
}
