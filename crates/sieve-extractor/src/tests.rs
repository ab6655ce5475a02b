//! Integration tests for the Extractor

#[cfg(test)]
mod tests {
    use crate::{
        DropReason, Extractor, ExtractorConfig, ExtractorError, ExtractionRequest,
        PromptStyle, PromptTemplate,
    };
    use serde_json::json;
    use sieve_domain::{ExtractionOutcome, GenerationInput};
    use sieve_llm::{ApproxTokenCount, CharCount, MockGenerator};
    use std::io::Write;

    fn config(max: usize, min: usize) -> ExtractorConfig {
        ExtractorConfig {
            max_chunk_length: max,
            min_chunk_length: min,
            ..ExtractorConfig::default()
        }
    }

    fn template() -> PromptTemplate {
        PromptTemplate::new("Extract sentences about buyer profiles. Output NONE otherwise.")
            .unwrap()
    }

    fn numbered_sentences(n: usize) -> String {
        (0..n)
            .map(|i| format!("This is sentence number {}.", i))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_two_short_sentences_make_one_chunk() {
        let generator = MockGenerator::new("NONE");
        let extractor = Extractor::new(generator, CharCount, config(200, 5));

        let request = ExtractionRequest::new("doc", "The mean age is 33.  The median is 31.");
        let report = extractor.extract(&request, &template()).unwrap();

        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(
            report.outcomes[0].chunk.text,
            "The mean age is 33. The median is 31."
        );
        assert_eq!(report.outcomes[0].chunk.sentence_range, 0..2);

        let inputs = extractor.generator().last_inputs().unwrap();
        assert_eq!(
            inputs,
            vec![GenerationInput::Text(format!(
                "{}\n\nText:\nThe mean age is 33. The median is 31.",
                template().text()
            ))]
        );
    }

    #[test]
    fn test_sentences_that_never_pair_make_one_chunk_each() {
        let generator = MockGenerator::new("NONE");
        // Each sentence is 26 chars; any pair is 53 > 40
        let extractor = Extractor::new(generator, CharCount, config(40, 10));

        let request = ExtractionRequest::new("doc", numbered_sentences(10));
        let report = extractor.extract(&request, &template()).unwrap();

        assert_eq!(report.metadata.sentence_count, 10);
        assert_eq!(report.outcomes.len(), 10);
        for (i, outcome) in report.outcomes.iter().enumerate() {
            assert_eq!(outcome.chunk.text, format!("This is sentence number {}.", i));
            assert_eq!(outcome.chunk.sentence_count(), 1);
        }
        assert_eq!(extractor.generator().call_count(), 1);
    }

    #[test]
    fn test_all_none_yields_empty_result() {
        let generator = MockGenerator::new("NONE");
        let extractor = Extractor::new(generator, CharCount, config(40, 10));

        let report = extractor
            .extract(&ExtractionRequest::new("doc", numbered_sentences(4)), &template())
            .unwrap();

        assert_eq!(report.outcomes.len(), 4);
        assert!(report
            .outcomes
            .iter()
            .all(|o| o.outcome == ExtractionOutcome::None));
        assert!(report.relevant.is_empty());
        assert_eq!(report.error_count(), 0);
    }

    #[test]
    fn test_generation_failure_marks_every_chunk() {
        let generator = MockGenerator::new("NONE").failing("device-side assert triggered");
        let extractor = Extractor::new(generator, CharCount, config(40, 10));

        let report = extractor
            .extract(&ExtractionRequest::new("doc", numbered_sentences(3)), &template())
            .unwrap();

        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.error_count(), 3);
        let first = &report.outcomes[0].outcome;
        assert!(report.outcomes.iter().all(|o| &o.outcome == first));
        assert!(first.to_string().starts_with("ERROR:"));
        assert!(report.relevant.is_empty());
    }

    #[test]
    fn test_unavailable_generator_aborts_document() {
        let generator = MockGenerator::new("NONE").unavailable();
        let extractor = Extractor::new(generator, CharCount, config(40, 10));

        let result =
            extractor.extract(&ExtractionRequest::new("doc", numbered_sentences(3)), &template());
        assert!(matches!(
            result,
            Err(ExtractorError::GenerationUnavailable(_))
        ));
    }

    #[test]
    fn test_mixed_responses_are_cleaned_and_filtered() {
        let generator = MockGenerator::new("NONE").with_responses([
            "\"Almost half these men are the age 30-39.\"",
            "Extracted Information:\nNONE",
            "  Extracted Information: Men come from all over metro Atlanta. ",
            "none",
        ]);
        let extractor = Extractor::new(generator, CharCount, config(40, 10));

        let report = extractor
            .extract(&ExtractionRequest::new("doc", numbered_sentences(4)), &template())
            .unwrap();

        assert_eq!(
            report.relevant,
            vec![
                "Almost half these men are the age 30-39.",
                "Men come from all over metro Atlanta."
            ]
        );
    }

    #[test]
    fn test_unrecognized_result_is_excluded() {
        let generator = MockGenerator::new("NONE").with_raw_results(vec![
            json!([{ "generated_text": "Buyers were mostly local." }]),
            json!({ "logits": [0.1, 0.9] }),
        ]);
        let extractor = Extractor::new(generator, CharCount, config(40, 10));

        let report = extractor
            .extract(&ExtractionRequest::new("doc", numbered_sentences(2)), &template())
            .unwrap();

        assert_eq!(report.relevant, vec!["Buyers were mostly local."]);
        assert!(report.outcomes[1].outcome.is_error());
    }

    #[test]
    fn test_short_result_list_pairs_by_position() {
        let generator = MockGenerator::new("NONE")
            .with_raw_results(vec![json!([{ "generated_text": "first only" }])]);
        let extractor = Extractor::new(generator, CharCount, config(40, 10));

        let report = extractor
            .extract(&ExtractionRequest::new("doc", numbered_sentences(3)), &template())
            .unwrap();

        assert_eq!(report.metadata.chunk_count, 3);
        assert_eq!(report.metadata.unanswered_chunks, 2);
        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.outcomes[0].chunk.text, "This is sentence number 0.");
        assert_eq!(report.relevant, vec!["first only"]);
    }

    #[test]
    fn test_oversized_sentence_is_truncated_end_to_end() {
        let generator = MockGenerator::new("NONE");
        let extractor = Extractor::new(generator, CharCount, config(30, 5));

        let text = "Short opener. This single sentence goes on far longer than thirty characters.";
        let report = extractor
            .extract(&ExtractionRequest::new("doc", text), &template())
            .unwrap();

        let chunks: Vec<&str> = report.outcomes.iter().map(|o| o.chunk.as_str()).collect();
        assert_eq!(chunks, vec!["Short opener.", "This single sentence goes on"]);
        assert!(report.outcomes[1].chunk.truncated);
        assert!(report.outcomes.iter().all(|o| o.chunk.length <= 30));
    }

    #[test]
    fn test_trailing_short_chunk_is_reported_as_dropped() {
        let generator = MockGenerator::new("NONE");
        let extractor = Extractor::new(generator, CharCount, config(30, 10));

        let text = "This sentence is long enough. Tiny.";
        let report = extractor
            .extract(&ExtractionRequest::new("doc", text), &template())
            .unwrap();

        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.dropped.len(), 1);
        assert_eq!(report.dropped[0].reason, DropReason::TooShort);
        assert_eq!(report.dropped[0].sentence_range, 1..2);
    }

    #[test]
    fn test_conversation_prompt_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "You are a research assistant analyzing text.").unwrap();
        let template = PromptTemplate::load(file.path()).unwrap();

        let generator = MockGenerator::new("NONE");
        let cfg = ExtractorConfig {
            prompt_style: PromptStyle::Conversation,
            ..config(200, 5)
        };
        let extractor = Extractor::new(generator, CharCount, cfg);

        extractor
            .extract(&ExtractionRequest::new("doc", "Men responded to ads."), &template)
            .unwrap();

        let inputs = extractor.generator().last_inputs().unwrap();
        let GenerationInput::Conversation(messages) = &inputs[0] else {
            panic!("Expected conversation input");
        };
        assert_eq!(messages[0].content, "You are a research assistant analyzing text.");
        assert!(messages[1].content.contains("\"Men responded to ads.\""));
    }

    #[test]
    fn test_generation_options_are_forwarded() {
        let generator = MockGenerator::new("NONE");
        let cfg = ExtractorConfig::small_context();
        let expected = cfg.generation.clone();
        let extractor = Extractor::new(generator, CharCount, cfg);

        extractor
            .extract(&ExtractionRequest::new("doc", numbered_sentences(2)), &template())
            .unwrap();

        assert_eq!(extractor.generator().last_options(), Some(expected));
    }

    #[test]
    fn test_extraction_is_repeatable() {
        let generator = MockGenerator::new("Relevant text.");
        let extractor = Extractor::new(generator, CharCount, config(60, 10));
        let request = ExtractionRequest::new("doc", numbered_sentences(7));

        let first = extractor.extract(&request, &template()).unwrap();
        let second = extractor.extract(&request, &template()).unwrap();

        assert_eq!(first.outcomes, second.outcomes);
        assert_eq!(first.relevant, second.relevant);
        assert_ne!(first.metadata.run_id, second.metadata.run_id);
    }

    #[test]
    fn test_token_budget_oracle() {
        let generator = MockGenerator::new("NONE");
        // 26 chars ≈ 7 tokens; two sentences ≈ 15 tokens
        let extractor = Extractor::new(generator, ApproxTokenCount, config(15, 2));

        let report = extractor
            .extract(&ExtractionRequest::new("doc", numbered_sentences(4)), &template())
            .unwrap();

        assert_eq!(report.outcomes.len(), 2);
        assert!(report.outcomes.iter().all(|o| o.chunk.length <= 15));
        assert_eq!(report.outcomes[0].chunk.sentence_count(), 2);
    }

    #[test]
    fn test_extract_all_keeps_documents_independent() {
        let generator = MockGenerator::new("NONE").with_responses(["From the first document."]);
        let extractor = Extractor::new(generator, CharCount, config(40, 10));

        let requests = vec![
            ExtractionRequest::new("a.txt", "Buyers were local men."),
            ExtractionRequest::new("empty.txt", ""),
            ExtractionRequest::new("b.txt", "Nothing relevant here."),
        ];
        let results = extractor.extract_all(&requests, &template());

        let ids: Vec<&str> = results.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["a.txt", "empty.txt", "b.txt"]);

        let reports: Vec<_> = results
            .into_iter()
            .map(|(_, r)| r.unwrap())
            .collect();
        assert_eq!(reports[0].relevant, vec!["From the first document."]);
        assert!(reports[1].outcomes.is_empty());
        assert!(reports[2].relevant.is_empty());
        // The empty document never reaches the generator
        assert_eq!(extractor.generator().call_count(), 2);
    }

    #[test]
    fn test_extract_all_reports_failures_per_document() {
        let generator = MockGenerator::new("NONE").unavailable();
        let extractor = Extractor::new(generator, CharCount, config(40, 10));

        let requests = vec![
            ExtractionRequest::new("empty.txt", "   "),
            ExtractionRequest::new("a.txt", "Buyers were local men."),
        ];
        let results = extractor.extract_all(&requests, &template());

        // No chunks means no generator is needed
        assert!(results[0].1.is_ok());
        assert!(matches!(
            results[1].1,
            Err(ExtractorError::GenerationUnavailable(_))
        ));
    }
}
