use resumeai_core::{
    update, AppState, AtsAnalysis, AtsResults, CoverLetterResults, DocumentPreview, Msg, Priority,
    ReportView, ResumeOptimization, ScoreComparison, ScoreTier, TaskState, TaskStatus,
    WorkflowKind, WorkflowPhase, WorkflowResults, ANALYSIS_PHASES, COMPLETE_PHASE_LABEL,
    INITIAL_PHASE_LABEL, NO_CATEGORY_SUGGESTIONS, NO_MISSING_KEYWORDS, SIMULATED_PERCENT_CAP,
};

fn displaying(kind: WorkflowKind, results: WorkflowResults) -> AppState {
    let state = AppState::new();
    let (state, _) = update(
        state,
        Msg::ResumeSelected {
            file_name: "resume.pdf".to_string(),
            bytes: b"%PDF-1.4 stub".to_vec(),
        },
    );
    let (state, _) = update(
        state,
        Msg::JobDescriptionChanged("Platform engineer".to_string()),
    );
    let (state, _) = update(state, Msg::SubmitRequested { kind });
    let (state, _) = update(
        state,
        Msg::SubmitAccepted {
            kind,
            session_id: "s1".to_string(),
            task_id: "t1".to_string(),
        },
    );
    let (state, _) = update(
        state,
        Msg::StatusPolled {
            kind,
            task_id: "t1".to_string(),
            status: TaskStatus {
                state: TaskState::Succeeded,
                message: None,
            },
        },
    );
    let (state, _) = update(
        state,
        Msg::ResultsFetched {
            kind,
            session_id: "s1".to_string(),
            results,
        },
    );
    state
}

fn sample_analysis() -> AtsAnalysis {
    AtsAnalysis {
        keyword_match_percentage: 0.62,
        hard_soft_skills_balance: 95.0,
        formatting_readability_score: 74.6,
        section_completion_percentage: 55.0,
        proximity_score: 0.3,
        total_ats_score: 63.0,
        missing_keywords: vec!["Kubernetes".to_string(), "Terraform".to_string()],
        improvement_suggestions: vec!["Add a metrics-driven summary".to_string()],
        searchability_suggestions: vec![
            "Your resume is missing a critical skill, consider adding it".to_string(),
            "You could mention the job title verbatim".to_string(),
            "Expand the skills section".to_string(),
        ],
        skills_suggestions: Vec::new(),
        formatting_suggestions: Vec::new(),
        section_suggestions: Vec::new(),
        synonym_suggestions: Vec::new(),
    }
}

#[test]
fn ats_report_normalizes_scores_and_classifies_suggestions() {
    let results = WorkflowResults::Ats(AtsResults {
        analysis: sample_analysis(),
        optimized_total_score: None,
        optimization: None,
    });
    let state = displaying(WorkflowKind::Analysis, results);

    let report = match state.view().analysis.report.expect("report") {
        ReportView::Ats(report) => report,
        other => panic!("unexpected report shape: {other:?}"),
    };

    assert_eq!(report.total_score, 63);
    assert_eq!(report.tier, ScoreTier::Teal);
    assert_eq!(report.improvement_banner, None);
    assert_eq!(report.missing_keywords.len(), 2);
    assert_eq!(report.missing_keywords_note, None);

    let labels: Vec<_> = report
        .categories
        .iter()
        .map(|category| category.label)
        .collect();
    assert_eq!(
        labels,
        vec![
            "Searchability",
            "Skills balance",
            "Formatting",
            "Section completion",
            "Keyword synonyms",
        ]
    );

    // Fractional 0.62 renders as 62 percent with four issues.
    let searchability = &report.categories[0];
    assert_eq!(searchability.percent, 62);
    assert_eq!(searchability.issues, 4);
    assert_eq!(
        searchability.advice,
        "This area needs attention to improve your ATS compatibility."
    );
    let priorities: Vec<_> = searchability
        .suggestions
        .iter()
        .map(|suggestion| suggestion.priority)
        .collect();
    assert_eq!(priorities, vec![Priority::High, Priority::Low, Priority::Medium]);

    // 95 is excellent: one issue, no filler note even without suggestions.
    let skills = &report.categories[1];
    assert_eq!(skills.percent, 95);
    assert_eq!(skills.issues, 1);
    assert_eq!(
        skills.advice,
        "Excellent! Your resume performs well in this category."
    );
    assert_eq!(skills.empty_note, None);

    // 74.6 rounds for display but keeps the [70, 80) issue band.
    let formatting = &report.categories[2];
    assert_eq!(formatting.percent, 75);
    assert_eq!(formatting.issues, 3);
    assert_eq!(formatting.empty_note, Some(NO_CATEGORY_SUGGESTIONS));

    let sections = &report.categories[3];
    assert_eq!(sections.issues, 5);
    assert_eq!(
        sections.advice,
        "This area needs attention to improve your ATS compatibility."
    );

    let synonyms = &report.categories[4];
    assert_eq!(synonyms.percent, 30);
    assert_eq!(synonyms.issues, 6);
    assert_eq!(
        synonyms.advice,
        "This is a critical area that requires significant improvement."
    );
}

#[test]
fn ats_report_without_missing_keywords_shows_the_empty_state() {
    let mut analysis = sample_analysis();
    analysis.missing_keywords.clear();
    let results = WorkflowResults::Ats(AtsResults {
        analysis,
        optimized_total_score: None,
        optimization: Some(ResumeOptimization {
            improved_summary: "Seasoned platform engineer".to_string(),
            improved_bullets: vec![(
                "Experience".to_string(),
                vec!["Cut deploy times by 40%".to_string()],
            )],
            suggested_skills: vec!["Kubernetes".to_string()],
        }),
    });
    let state = displaying(WorkflowKind::Analysis, results);

    let report = match state.view().analysis.report.expect("report") {
        ReportView::Ats(report) => report,
        other => panic!("unexpected report shape: {other:?}"),
    };

    assert!(report.missing_keywords.is_empty());
    assert_eq!(report.missing_keywords_note, Some(NO_MISSING_KEYWORDS));
    assert_eq!(
        report.improved_summary.as_deref(),
        Some("Seasoned platform engineer")
    );
    assert_eq!(report.improved_bullets.len(), 1);
    assert_eq!(report.suggested_skills, vec!["Kubernetes".to_string()]);
}

#[test]
fn cover_letter_report_carries_the_generated_text() {
    let results = WorkflowResults::CoverLetter(CoverLetterResults {
        text: "Dear hiring manager,".to_string(),
    });
    let state = displaying(WorkflowKind::Generation, results);

    let view = state.view();
    assert_eq!(view.generation.phase, WorkflowPhase::Displaying);
    match view.generation.report.expect("report") {
        ReportView::CoverLetter(letter) => {
            assert_eq!(letter.body, "Dear hiring manager,");
        }
        other => panic!("unexpected report shape: {other:?}"),
    }
}

#[test]
fn resume_preview_renders_the_score_comparison() {
    let kind = WorkflowKind::Analysis;
    let results = WorkflowResults::Ats(AtsResults::default());
    let state = displaying(kind, results);

    let (state, _) = update(state, Msg::PreviewRequested { kind });
    let (state, _) = update(
        state,
        Msg::PreviewFetched {
            kind,
            session_id: "s1".to_string(),
            preview: DocumentPreview {
                content: "JANE DOE\nPlatform Engineer".to_string(),
                score_comparison: Some(ScoreComparison {
                    original_score: 62.0,
                    optimized_score: 81.0,
                }),
            },
        },
    );

    let preview = state.view().analysis.preview.expect("preview");
    assert_eq!(preview.title, "Resume Preview");
    assert!(preview.content.starts_with("JANE DOE"));
    let comparison = preview.comparison.expect("comparison");
    assert_eq!(comparison.original, 62);
    assert_eq!(comparison.optimized, 81);
    assert_eq!(comparison.improvement, 19);
    assert_eq!(comparison.percentage, "+31%");
}

#[test]
fn zero_original_score_comparison_renders_na() {
    let kind = WorkflowKind::Analysis;
    let state = displaying(kind, WorkflowResults::Ats(AtsResults::default()));

    let (state, _) = update(
        state,
        Msg::PreviewFetched {
            kind,
            session_id: "s1".to_string(),
            preview: DocumentPreview {
                content: "JANE DOE".to_string(),
                score_comparison: Some(ScoreComparison {
                    original_score: 0.0,
                    optimized_score: 40.0,
                }),
            },
        },
    );

    let comparison = state
        .view()
        .analysis
        .preview
        .expect("preview")
        .comparison
        .expect("comparison");
    assert_eq!(comparison.percentage, "N/A");
}

#[test]
fn progress_walks_phases_and_completes_on_success() {
    let kind = WorkflowKind::Analysis;
    let state = AppState::new();
    let (state, _) = update(
        state,
        Msg::ResumeSelected {
            file_name: "resume.pdf".to_string(),
            bytes: b"%PDF-1.4 stub".to_vec(),
        },
    );
    let (state, _) = update(state, Msg::JobDescriptionChanged("SRE".to_string()));
    let (state, _) = update(state, Msg::SubmitRequested { kind });

    let view = state.view();
    assert_eq!(view.analysis.percent, 0);
    assert_eq!(view.analysis.phase_label, INITIAL_PHASE_LABEL);
    assert!(view.analysis.busy);

    let (state, _) = update(state, Msg::ProgressTicked { kind });
    let view = state.view();
    assert_eq!(view.analysis.phase_label, ANALYSIS_PHASES[0]);
    assert!(view.analysis.percent > 0);

    // Run the ticker far past the end of the phase list.
    let mut state = state;
    for _ in 0..20 {
        let (next, _) = update(state, Msg::ProgressTicked { kind });
        state = next;
    }
    let view = state.view();
    assert_eq!(view.analysis.percent, SIMULATED_PERCENT_CAP);
    assert_eq!(
        view.analysis.phase_label,
        ANALYSIS_PHASES[ANALYSIS_PHASES.len() - 1]
    );

    let (state, _) = update(
        state,
        Msg::SubmitAccepted {
            kind,
            session_id: "s1".to_string(),
            task_id: "t1".to_string(),
        },
    );
    let (mut state, _) = update(
        state,
        Msg::StatusPolled {
            kind,
            task_id: "t1".to_string(),
            status: TaskStatus {
                state: TaskState::Succeeded,
                message: None,
            },
        },
    );

    // Terminal state forces the complete frame regardless of the cap.
    let view = state.view();
    assert_eq!(view.analysis.phase, WorkflowPhase::Fetching);
    assert_eq!(view.analysis.percent, 100);
    assert_eq!(view.analysis.phase_label, COMPLETE_PHASE_LABEL);
    state.consume_dirty();

    // Ticks landing after the terminal transition change nothing.
    let (mut state, effects) = update(state, Msg::ProgressTicked { kind });
    assert!(effects.is_empty());
    assert!(!state.consume_dirty());
    assert_eq!(state.view().analysis.percent, 100);
}
