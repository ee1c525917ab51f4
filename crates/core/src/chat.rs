//! Canned assistant replies used when no language model is reachable.

/// Pick a canned reply by keyword.
///
/// Topics are checked in a fixed order (temperature, humidity, vibration,
/// general help); the first match wins.
pub fn fallback_reply(message: &str) -> String {
    let lower = message.to_lowercase();
    let mentions = |words: &[&str]| words.iter().any(|w| lower.contains(w));

    if mentions(&["temperature", "temp"]) {
        "The ideal temperature range for museum exhibits is 18-24°C (64-75°F).".to_string()
    } else if mentions(&["humidity", "moisture"]) {
        "Museum humidity should be maintained between 40-60% RH.".to_string()
    } else if mentions(&["vibration", "shake"]) {
        "Vibrations can damage delicate artifacts over time. Monitor levels carefully.".to_string()
    } else if mentions(&["help", "how", "what"]) {
        "I can help with museum environmental monitoring questions.".to_string()
    } else {
        format!(
            "I understand you're asking about: '{message}'. For museum monitoring, \
             check temperature, humidity, and vibration levels regularly."
        )
    }
}
