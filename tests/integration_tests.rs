//! Integration tests exercising the presentation tools end to end.
//!
//! Every test points the store at its own temporary directory, so nothing
//! touches the real storage root.

use powerpoint_mcp_server::error::PowerPointServerError;
use powerpoint_mcp_server::pptx::{Align, Presentation};
use powerpoint_mcp_server::storage::PresentationStore;
use powerpoint_mcp_server::tools::*;

fn temp_store() -> (tempfile::TempDir, PresentationStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = PresentationStore::new(dir.path().join("PowerPoints"));
    (dir, store)
}

fn create(store: &PresentationStore, filename: &str, title: &str) -> CreatePresentationResult {
    create_presentation(
        store,
        CreatePresentationParams {
            filename: filename.to_string(),
            title: title.to_string(),
        },
    )
    .unwrap()
}

// ============== Create Presentation Tests ==============

mod create {
    use super::*;

    #[test]
    fn test_create_with_title_slide() {
        let (_dir, store) = temp_store();

        let result = create(&store, "Quarterly Report", "Q1 Results");
        assert_eq!(result.filename, "Quarterly Report.pptx");
        assert!(result.title_slide);
        assert!(store.root().join("Quarterly Report.pptx").is_file());
    }

    #[test]
    fn test_create_without_title_has_zero_slides() {
        let (_dir, store) = temp_store();

        let result = create(&store, "empty-deck", "");
        assert!(!result.title_slide);

        let prs = Presentation::open(&store.resolve("empty-deck")).unwrap();
        assert_eq!(prs.slide_count(), 0);
    }

    #[test]
    fn test_create_sanitizes_filename() {
        let (_dir, store) = temp_store();

        let result = create(&store, "q1/q2: plan?", "Plan");
        assert_eq!(result.filename, "q1_q2_ plan_.pptx");
        assert!(store.root().join("q1_q2_ plan_.pptx").is_file());
    }

    #[test]
    fn test_create_empty_filename_rejected() {
        let (_dir, store) = temp_store();

        let result = create_presentation(
            &store,
            CreatePresentationParams {
                filename: "   ".to_string(),
                title: "Ignored".to_string(),
            },
        );
        assert!(matches!(
            result,
            Err(PowerPointServerError::FilenameRequired)
        ));
        // Nothing may be written, not even the root directory contents.
        assert_eq!(std::fs::read_dir(store.root()).map(|d| d.count()).unwrap_or(0), 0);
    }

    #[test]
    fn test_create_success_message() {
        let (_dir, store) = temp_store();

        let result = create(&store, "deck", "");
        assert_eq!(
            result.to_string(),
            format!(
                "✅ Success: Created presentation 'deck.pptx' in {}",
                store.root().display()
            )
        );
    }
}

// ============== Add Slide Tests ==============

mod add {
    use super::*;

    #[test]
    fn test_round_trip_create_then_describe() {
        let (_dir, store) = temp_store();
        create(&store, "Quarterly Report", "Q1 Results");

        let info = get_presentation_info(
            &store,
            GetPresentationInfoParams {
                filename: "Quarterly Report".to_string(),
            },
        )
        .unwrap();

        assert_eq!(info.slide_count, 1);
        assert_eq!(info.slide_titles, vec!["Q1 Results".to_string()]);
    }

    #[test]
    fn test_two_appends_in_order() {
        let (_dir, store) = temp_store();
        create(&store, "deck", "Intro");

        for title in ["Agenda", "Roadmap"] {
            let result = add_slide(
                &store,
                AddSlideParams {
                    filename: "deck".to_string(),
                    slide_title: title.to_string(),
                    slide_content: "point one\npoint two".to_string(),
                },
            )
            .unwrap();
            assert_eq!(result.filename, "deck.pptx");
        }

        let info = get_presentation_info(
            &store,
            GetPresentationInfoParams {
                filename: "deck".to_string(),
            },
        )
        .unwrap();
        assert_eq!(info.slide_count, 3);
        assert_eq!(
            info.slide_titles,
            vec![
                "Intro".to_string(),
                "Agenda".to_string(),
                "Roadmap".to_string()
            ]
        );
    }

    #[test]
    fn test_append_reports_new_total() {
        let (_dir, store) = temp_store();
        create(&store, "deck", "");

        let first = add_slide(
            &store,
            AddSlideParams {
                filename: "deck".to_string(),
                slide_title: "One".to_string(),
                slide_content: String::new(),
            },
        )
        .unwrap();
        assert_eq!(first.slide_count, 1);

        let second = add_slide(
            &store,
            AddSlideParams {
                filename: "deck".to_string(),
                slide_title: "Two".to_string(),
                slide_content: String::new(),
            },
        )
        .unwrap();
        assert_eq!(second.slide_count, 2);
        assert_eq!(
            second.to_string(),
            "✅ Success: Added slide to 'deck.pptx'. Total slides: 2"
        );
    }

    #[test]
    fn test_body_formatted_at_14pt_left() {
        let (_dir, store) = temp_store();
        create(&store, "deck", "");
        add_slide(
            &store,
            AddSlideParams {
                filename: "deck".to_string(),
                slide_title: "Points".to_string(),
                slide_content: "alpha\nbeta".to_string(),
            },
        )
        .unwrap();

        let prs = Presentation::open(&store.resolve("deck")).unwrap();
        let slide = &prs.slides()[0];
        assert_eq!(slide.body().len(), 2);
        for para in slide.body() {
            assert_eq!(para.size_pt, Some(14));
            assert_eq!(para.align, Some(Align::Left));
        }
    }

    #[test]
    fn test_untitled_slide_reported_as_untitled() {
        let (_dir, store) = temp_store();
        create(&store, "deck", "");
        add_slide(
            &store,
            AddSlideParams {
                filename: "deck".to_string(),
                slide_title: String::new(),
                slide_content: "body without a title".to_string(),
            },
        )
        .unwrap();

        let info = get_presentation_info(
            &store,
            GetPresentationInfoParams {
                filename: "deck".to_string(),
            },
        )
        .unwrap();
        assert_eq!(info.slide_titles, vec!["Untitled".to_string()]);
    }

    #[test]
    fn test_add_slide_missing_file() {
        let (_dir, store) = temp_store();
        store.ensure_root().unwrap();

        let result = add_slide(
            &store,
            AddSlideParams {
                filename: "ghost".to_string(),
                slide_title: "Title".to_string(),
                slide_content: String::new(),
            },
        );
        assert!(matches!(
            result,
            Err(PowerPointServerError::PresentationNotFound { .. })
        ));
        // No file may appear as a side effect.
        assert!(!store.root().join("ghost.pptx").exists());
    }

    #[test]
    fn test_add_slide_accepts_suffixed_filename() {
        let (_dir, store) = temp_store();
        create(&store, "deck", "");

        let result = add_slide(
            &store,
            AddSlideParams {
                filename: "deck.pptx".to_string(),
                slide_title: "Suffixed".to_string(),
                slide_content: String::new(),
            },
        )
        .unwrap();
        assert_eq!(result.filename, "deck.pptx");
        assert!(!store.root().join("deck.pptx.pptx").exists());
    }
}

// ============== Listing Tests ==============

mod listing {
    use super::*;

    #[test]
    fn test_list_missing_directory() {
        let (_dir, store) = temp_store();

        let result = list_presentations(&store, ListPresentationsParams {}).unwrap();
        assert!(!result.directory_exists);
        assert!(result.presentations.is_empty());
        assert!(result.to_string().contains("does not exist yet"));
    }

    #[test]
    fn test_list_empty_directory() {
        let (_dir, store) = temp_store();
        store.ensure_root().unwrap();

        let result = list_presentations(&store, ListPresentationsParams {}).unwrap();
        assert!(result.directory_exists);
        assert!(result.presentations.is_empty());
        assert!(result
            .to_string()
            .contains("No PowerPoint presentations found"));
    }

    #[test]
    fn test_list_sorted_entries() {
        let (_dir, store) = temp_store();
        create(&store, "zebra", "");
        create(&store, "alpha", "");

        let result = list_presentations(&store, ListPresentationsParams {}).unwrap();
        let names: Vec<_> = result
            .presentations
            .iter()
            .map(|p| p.filename.as_str())
            .collect();
        assert_eq!(names, vec!["alpha.pptx", "zebra.pptx"]);
        for entry in &result.presentations {
            assert!(entry.size_bytes > 0);
        }

        let rendered = result.to_string();
        assert!(rendered.contains("1. **alpha.pptx**"));
        assert!(rendered.contains("2. **zebra.pptx**"));
    }
}

// ============== Describe Tests ==============

mod describe {
    use super::*;

    #[test]
    fn test_describe_missing_file() {
        let (_dir, store) = temp_store();
        store.ensure_root().unwrap();

        let result = get_presentation_info(
            &store,
            GetPresentationInfoParams {
                filename: "ghost".to_string(),
            },
        );
        assert!(matches!(
            result,
            Err(PowerPointServerError::PresentationNotFound { .. })
        ));
    }

    #[test]
    fn test_describe_empty_filename() {
        let (_dir, store) = temp_store();

        let result = get_presentation_info(
            &store,
            GetPresentationInfoParams {
                filename: String::new(),
            },
        );
        assert!(matches!(
            result,
            Err(PowerPointServerError::FilenameRequired)
        ));
    }

    #[test]
    fn test_describe_report_contents() {
        let (_dir, store) = temp_store();
        create(&store, "deck", "Kickoff");

        let info = get_presentation_info(
            &store,
            GetPresentationInfoParams {
                filename: "deck".to_string(),
            },
        )
        .unwrap();
        assert!(info.size_bytes > 0);
        assert!(info.path.ends_with("deck.pptx"));

        let rendered = info.to_string();
        assert!(rendered.contains("📊 Presentation Info: **deck.pptx**"));
        assert!(rendered.contains("- Total slides: 1"));
        assert!(rendered.contains("1. Kickoff"));
    }
}

// ============== Codec Tests ==============

mod codec {
    use super::*;

    #[test]
    fn test_open_rejects_garbage() {
        let (_dir, store) = temp_store();
        store.ensure_root().unwrap();
        let path = store.resolve("broken");
        std::fs::write(&path, b"this is not a zip archive").unwrap();

        assert!(Presentation::open(&path).is_err());
    }

    #[test]
    fn test_title_slide_subtitle_mentions_creation_date() {
        let (_dir, store) = temp_store();
        create(&store, "deck", "Kickoff");

        let prs = Presentation::open(&store.resolve("deck")).unwrap();
        let slide = &prs.slides()[0];
        assert_eq!(slide.title(), Some("Kickoff"));
        assert_eq!(slide.body().len(), 1);
        assert!(slide.body()[0].text.starts_with("Created on "));
    }
}
