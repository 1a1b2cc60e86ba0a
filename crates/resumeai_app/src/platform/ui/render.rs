use resumeai_core::{
    AppViewModel, AtsReportView, PreviewView, ReportView, ScoreTier, WorkflowView,
};

/// Builds console output for state changes, diffing successive view
/// models so an unchanged workflow prints nothing.
pub(crate) struct Renderer {
    last: Option<AppViewModel>,
}

impl Renderer {
    pub(crate) fn new() -> Self {
        Self { last: None }
    }

    pub(crate) fn render(&mut self, view: &AppViewModel) -> Vec<String> {
        let mut lines = Vec::new();
        workflow_lines(
            &mut lines,
            &view.analysis,
            self.last.as_ref().map(|last| &last.analysis),
        );
        workflow_lines(
            &mut lines,
            &view.generation,
            self.last.as_ref().map(|last| &last.generation),
        );
        self.last = Some(view.clone());
        lines
    }
}

/// Full-state summary for the `status` command.
pub(crate) fn summary(view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(match &view.resume_file_name {
        Some(name) => format!("resume: {name}"),
        None => "resume: (none)".to_string(),
    });
    lines.push(format!(
        "job description: {} characters",
        view.job_description_len
    ));
    for workflow in [&view.analysis, &view.generation] {
        let name = workflow.kind.label();
        let mut line = format!("{name}: {}", phase_word(workflow));
        if let Some(session) = &workflow.session_id {
            line.push_str(&format!(" (session {session})"));
        }
        lines.push(line);
        if let Some(notice) = &workflow.notice {
            lines.push(format!("  {notice}"));
        }
    }
    lines
}

fn phase_word(view: &WorkflowView) -> String {
    use resumeai_core::WorkflowPhase::*;
    match view.phase {
        Idle => "idle".to_string(),
        Submitting | Polling => format!("running, {}% - {}", view.percent, view.phase_label),
        Fetching => "loading results".to_string(),
        Displaying => "finished".to_string(),
    }
}

fn workflow_lines(lines: &mut Vec<String>, view: &WorkflowView, last: Option<&WorkflowView>) {
    let name = view.kind.label();

    if view.busy {
        let changed = last.is_none_or(|last| {
            !last.busy || last.percent != view.percent || last.phase_label != view.phase_label
        });
        if changed {
            lines.push(format!("[{name}] {:>3}% {}", view.percent, view.phase_label));
        }
    }

    if let Some(notice) = &view.notice {
        if last.is_none_or(|last| last.notice.as_ref() != Some(notice)) {
            lines.push(format!("[{name}] {notice}"));
        }
    }

    match (&view.report, last.and_then(|last| last.report.as_ref())) {
        (Some(report), previous) if previous != Some(report) => {
            report_lines(lines, name, report);
        }
        (None, Some(_)) if view.notice.is_none() => {
            lines.push(format!("[{name}] cleared"));
        }
        _ => {}
    }

    match (&view.preview, last.and_then(|last| last.preview.as_ref())) {
        (Some(preview), previous) if previous != Some(preview) => {
            preview_lines(lines, preview);
        }
        (None, Some(_)) => lines.push(format!("[{name}] preview closed")),
        _ => {}
    }

    if let Some(path) = &view.last_download {
        if last.is_none_or(|last| last.last_download.as_ref() != Some(path)) {
            lines.push(format!("[{name}] saved {}", path.display()));
        }
    }
}

fn report_lines(lines: &mut Vec<String>, name: &str, report: &ReportView) {
    match report {
        ReportView::Ats(report) => ats_report_lines(lines, report),
        ReportView::CoverLetter(letter) => {
            lines.push(format!("--- {name} ---"));
            lines.push(letter.body.clone());
            lines.push("---".to_string());
        }
    }
}

fn ats_report_lines(lines: &mut Vec<String>, report: &AtsReportView) {
    lines.push(format!(
        "ATS score: {}/100 ({})",
        report.total_score,
        tier_word(report.tier)
    ));
    if let Some(banner) = &report.improvement_banner {
        lines.push(banner.clone());
    }
    for category in &report.categories {
        lines.push(format!(
            "  {}: {}% ({} issues) - {}",
            category.label, category.percent, category.issues, category.advice
        ));
        for suggestion in &category.suggestions {
            lines.push(format!(
                "    [{}] {}",
                suggestion.priority.label(),
                suggestion.text
            ));
        }
        if let Some(note) = category.empty_note {
            lines.push(format!("    {note}"));
        }
    }
    match report.missing_keywords_note {
        Some(note) => lines.push(format!("  {note}")),
        None => lines.push(format!(
            "  Missing keywords: {}",
            report.missing_keywords.join(", ")
        )),
    }
    if !report.general_suggestions.is_empty() {
        lines.push("  Suggestions:".to_string());
        for suggestion in &report.general_suggestions {
            lines.push(format!("    - {suggestion}"));
        }
    }
    if let Some(summary) = &report.improved_summary {
        lines.push(format!("  Improved summary: {summary}"));
    }
    for (section, bullets) in &report.improved_bullets {
        lines.push(format!("  {section}:"));
        for bullet in bullets {
            lines.push(format!("    - {bullet}"));
        }
    }
    if !report.suggested_skills.is_empty() {
        lines.push(format!(
            "  Suggested skills: {}",
            report.suggested_skills.join(", ")
        ));
    }
}

fn preview_lines(lines: &mut Vec<String>, preview: &PreviewView) {
    lines.push(format!("--- {} ---", preview.title));
    if let Some(comparison) = &preview.comparison {
        lines.push(format!(
            "Original: {} | Optimized: {} | Improvement: {:+} ({})",
            comparison.original,
            comparison.optimized,
            comparison.improvement,
            comparison.percentage
        ));
    }
    lines.push(preview.content.clone());
    lines.push("---".to_string());
}

fn tier_word(tier: ScoreTier) -> &'static str {
    match tier {
        ScoreTier::Green => "excellent",
        ScoreTier::Teal => "good",
        ScoreTier::Amber => "fair",
        ScoreTier::Red => "needs work",
    }
}
