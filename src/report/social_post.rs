use super::top_performers::TopPerformers;
use crate::store::format_date;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

pub const SOCIAL_POST_FILE: &str = "linkedin_post.txt";

const HASHTAGS: &str = "#MLB #Baseball #DataAnalytics #SportsAnalytics #BaseballStats";

fn team(team: &Option<String>) -> &str {
    team.as_deref().unwrap_or("N/A")
}

/// Text of the daily highlights post. Leaders that could not be
/// identified are left out.
pub fn social_post(date: NaiveDate, top: &TopPerformers) -> String {
    let mut post = format!(
        "⚾ MLB Performance Highlights - {} ⚾\n\n🔥 TODAY'S STANDOUT PERFORMERS 🔥\n\n",
        format_date(date)
    );

    if let Some(h) = &top.best_ops {
        post.push_str(&format!(
            "🏆 BEST OPS: {} ({})\n   • OPS: {:.3}\n   • AVG: {:.3} | HR: {}\n\n",
            h.name,
            team(&h.team),
            h.ops,
            h.avg,
            h.home_runs
        ));
    }
    if let Some(h) = &top.home_run_leader {
        post.push_str(&format!(
            "💪 HOME RUN LEADER: {} ({})\n   • Home Runs: {}\n   • RBI: {} | OPS: {:.3}\n\n",
            h.name,
            team(&h.team),
            h.home_runs,
            h.rbi,
            h.ops
        ));
    }
    if let Some(p) = &top.best_era {
        post.push_str(&format!(
            "⭐ BEST ERA (Qualified): {} ({})\n   • ERA: {:.2}\n   • WHIP: {:.2} | SO: {}\n\n",
            p.name,
            team(&p.team),
            p.era,
            p.whip,
            p.strikeouts
        ));
    }
    if let Some(p) = &top.strikeout_leader {
        post.push_str(&format!(
            "🔥 STRIKEOUT LEADER: {} ({})\n   • Strikeouts: {}\n   • ERA: {:.2} | IP: {:.1}\n\n",
            p.name,
            team(&p.team),
            p.strikeouts,
            p.era,
            p.innings
        ));
    }

    post.push_str("📊 Full interactive dashboards and advanced analytics available!\n\n");
    post.push_str(HASHTAGS);
    post
}

pub fn write_social_post(dir: &Path, date: NaiveDate, top: &TopPerformers) -> Result<PathBuf> {
    let path = dir.join(SOCIAL_POST_FILE);
    std::fs::write(&path, social_post(date, top))
        .with_context(|| format!("Failed to write post to {:?}", path))?;
    Ok(path)
}
