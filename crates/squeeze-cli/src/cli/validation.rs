/// Parse a `--jobs` value: a whole number, at least 1.
pub fn parse_jobs(s: &str) -> Result<usize, String> {
    let jobs: usize = s
        .trim()
        .parse()
        .map_err(|_| format!("Job count must be a whole number: '{}'", s))?;
    if jobs == 0 {
        return Err("Job count must be at least 1".to_string());
    }
    Ok(jobs)
}
