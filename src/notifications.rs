/// Desktop notifications
/// Currently only implements macOS notifications

#[cfg(target_os = "macos")]
use std::process::Command;

fn send(title: &str, body: &str) {
    #[cfg(target_os = "macos")]
    {
        let script = format!(
            r#"display notification "{}" with title "{}""#,
            body.replace('"', "\\\""),
            title.replace('"', "\\\"")
        );

        if let Err(e) = Command::new("osascript").arg("-e").arg(&script).output() {
            log::debug!("notification failed: {}", e);
        }
    }

    #[cfg(not(target_os = "macos"))]
    {
        // No-op on other platforms
        let _ = (title, body);
    }
}

/// A task went past its estimate plus tolerance
pub fn notify_task_exceeded(task_name: &str) {
    send("Taskflow - Time Exceeded", &format!("⏰ {}", task_name));
}

pub fn notify_task_completed(task_name: &str, point_awarded: bool) {
    let body = if point_awarded {
        format!("{} (+1 point)", task_name)
    } else {
        task_name.to_string()
    };
    send("Taskflow - Task Completed", &body);
}

pub fn notify_pause_due(pause_minutes: u64) {
    send(
        "Taskflow - Time for a Break",
        &format!("Take a {} minute pause", pause_minutes),
    );
}

pub fn notify_focus_finished() {
    send("Taskflow - Focus Session Done", "Pomodoro finished");
}

/// Terminal title shown on the alternate beat of an exceeded alert
pub fn alert_title(task_name: &str) -> String {
    format!("⏰ Time exceeded: {}", task_name)
}
