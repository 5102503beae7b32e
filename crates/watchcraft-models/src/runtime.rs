/// Format a duration in whole minutes as `"{h}h {m}m"`, or `"{m}m"` under an hour
pub fn format_runtime(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_runtime() {
        assert_eq!(format_runtime(0), "0m");
        assert_eq!(format_runtime(59), "59m");
        assert_eq!(format_runtime(60), "1h 0m");
        assert_eq!(format_runtime(125), "2h 5m");
    }
}
