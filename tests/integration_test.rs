#[cfg(test)]
mod tests {
    use screening_games_bot::bank::{QuestionBanks, TieredBank};
    use screening_games_bot::catalog::{
        available_games, find_game, first_game, next_game, playable_game, validate_age, NextStep,
        GAMES,
    };
    use screening_games_bot::config::AppConfig;
    use screening_games_bot::engine::{evaluate, next_difficulty, normalize, MatchRule};
    use screening_games_bot::storage::SessionStorage;
    use screening_games_bot::writing::{AgeTier, PassageBank};
    use screening_games_bot::*;
    use std::collections::HashMap;
    use std::error::Error;
    use std::io::Write;
    use std::path::PathBuf;
    use std::time::Duration;
    use teloxide::types::InlineKeyboardButtonKind;
    use tempfile::NamedTempFile;

    // Helper function to create a test question
    fn create_test_question() -> Question {
        Question {
            prompt: String::from("What does the symbol + mean?"),
            options: vec![
                String::from("Add"),
                String::from("Divide"),
                String::from("Subtract"),
            ],
            correct_answer: String::from("Add"),
            difficulty: Difficulty::Easy,
            follow_up: String::from("+ means add."),
        }
    }

    fn data_path(file: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join(file)
    }

    // Helper function to create temporary CSV files with test questions
    fn create_test_csv() -> Result<(NamedTempFile, NamedTempFile), Box<dyn Error>> {
        let mut questions = NamedTempFile::new()?;
        writeln!(questions, "game_id,prompt,options,correct_answer,difficulty,follow_up")?;
        writeln!(questions, "symbol-confusion,What does + mean?,Add|Divide,Add,,+ means add.")?;
        writeln!(questions, "symbol-confusion,What does ÷ mean?,Add|Divide,Divide,hard,÷ means divide.")?;
        writeln!(questions, "place-value,\"Value of 7 in 2,743?\",7|70|700,700,medium,Hundreds place.")?;

        let mut scenarios = NamedTempFile::new()?;
        writeln!(scenarios, "scenario,avatar,intro,difficulty,question,answer,follow_up")?;
        writeln!(scenarios, "Shop,🛒,Welcome!,easy,1+1?,2,Yes.")?;
        writeln!(scenarios, "Shop,🛒,Welcome!,medium,2+3?,5,Yes.")?;
        writeln!(scenarios, "Shop,🛒,Welcome!,hard,12x3?,36,Yes.")?;
        writeln!(scenarios, "Market,🍎,Hello!,medium,4+4?,8,Yes.")?;
        writeln!(scenarios, "Market,🍎,Hello!,easy,1+2?,3,Yes.")?;
        writeln!(scenarios, "Market,🍎,Hello!,hard,9x4?,36,Yes.")?;

        Ok((questions, scenarios))
    }

    #[test]
    fn test_question_free_text() {
        let mut question = create_test_question();
        assert!(!question.is_free_text());
        question.options.clear();
        assert!(question.is_free_text());
    }

    // Test keyboard creation
    #[test]
    fn test_create_keyboard_initial() {
        let question = create_test_question();
        let keyboard = create_keyboard(&question, None, false, true);
        let rows = keyboard.inline_keyboard;

        assert_eq!(rows.len(), 4); // 3 options + quit button
        assert!(rows[3][0].text.contains("🛑"));
        for row in &rows {
            assert_eq!(row.len(), 1);
            assert!(!row[0].text.contains("✅"));
            assert!(!row[0].text.contains("❌"));
        }
        match &rows[0][0].kind {
            InlineKeyboardButtonKind::CallbackData(data) => assert_eq!(data, "ans:Add"),
            other => panic!("unexpected button kind: {:?}", other),
        }
    }

    #[test]
    fn test_create_keyboard_with_incorrect_answer() {
        let question = create_test_question();
        let keyboard = create_keyboard(&question, Some("Divide"), true, false);
        let rows = keyboard.inline_keyboard;

        assert_eq!(rows.len(), 3);
        let chosen = rows.iter().find(|row| row[0].text.contains("Divide")).unwrap();
        let correct = rows.iter().find(|row| row[0].text.contains("Add")).unwrap();
        let untouched = rows.iter().find(|row| row[0].text.contains("Subtract")).unwrap();

        assert!(chosen[0].text.starts_with("❌"));
        assert!(correct[0].text.starts_with("✅"));
        assert_eq!(untouched[0].text, "Subtract");
    }

    #[test]
    fn test_free_text_keyboard_only_has_quit() {
        let mut question = create_test_question();
        question.options.clear();
        let rows = create_keyboard(&question, None, false, true).inline_keyboard;
        assert_eq!(rows.len(), 1);
        assert!(rows[0][0].text.contains("Quit"));
    }

    #[test]
    fn test_result_keyboard_points_to_next_game() {
        let spec = find_game("clock-reading").unwrap();
        let rows = result_keyboard(NextStep::Game(spec)).inline_keyboard;
        match &rows[0][0].kind {
            InlineKeyboardButtonKind::CallbackData(data) => assert_eq!(data, "play:clock-reading"),
            other => panic!("unexpected button kind: {:?}", other),
        }

        let rows = result_keyboard(NextStep::Reports).inline_keyboard;
        match &rows[0][0].kind {
            InlineKeyboardButtonKind::CallbackData(data) => assert_eq!(data, SHOW_REPORT),
            other => panic!("unexpected button kind: {:?}", other),
        }
    }

    // Test CSV loading
    #[test]
    fn test_load_questions_from_csv() -> Result<(), Box<dyn Error>> {
        let (questions, scenarios) = create_test_csv()?;
        let banks = QuestionBanks::load(questions.path(), scenarios.path())?;

        let symbols = banks.bank("symbol-confusion")?;
        assert_eq!(symbols.len(), 2);
        let first = symbols.get(0).unwrap();
        assert_eq!(first.options, vec!["Add", "Divide"]);
        assert_eq!(first.difficulty, Difficulty::Medium);
        assert_eq!(symbols.get(1).unwrap().difficulty, Difficulty::Hard);
        assert!(symbols.get(2).is_none());

        assert_eq!(banks.bank("place-value")?.get(0).unwrap().prompt, "Value of 7 in 2,743?");
        assert!(matches!(
            banks.bank("nope"),
            Err(ScreeningError::UnknownGame(_))
        ));

        let scenarios = banks.scenarios();
        assert_eq!(scenarios.len(), 2);
        assert_eq!(scenarios[0].name, "Shop");
        assert!(scenarios.iter().all(|s| s.tiers.is_complete()));
        assert_eq!(scenarios[1].tiers.pick(Difficulty::Easy, 0).unwrap().correct_answer, "3");
        assert!(scenarios[0].tiers.pick(Difficulty::Hard, 0).unwrap().is_free_text());
        Ok(())
    }

    #[test]
    fn test_scenario_missing_a_tier_is_rejected() -> Result<(), Box<dyn Error>> {
        let questions = "game_id,prompt,options,correct_answer,difficulty,follow_up\n";
        let scenarios = "scenario,avatar,intro,difficulty,question,answer,follow_up\n\
                         Shop,🛒,Welcome!,medium,2+3?,5,Yes.\n\
                         Shop,🛒,Welcome!,easy,1+1?,2,Yes.\n";

        let err = QuestionBanks::from_readers(questions.as_bytes(), scenarios.as_bytes()).unwrap_err();
        match err {
            ScreeningError::IncompleteBank(msg) => assert!(msg.contains("hard"), "{}", msg),
            other => panic!("unexpected error: {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_multi_step_currency_labels() -> Result<(), Box<dyn Error>> {
        let banks = QuestionBanks::load(data_path("questions.csv"), data_path("scenarios.csv"))?;
        let multi_step = banks.bank("multi-step")?;

        // counts of things are plain numbers, money answers keep the rupee sign
        let stickers = multi_step.iter().find(|q| q.prompt.contains("stickers")).unwrap();
        assert_eq!(stickers.options, vec!["3", "12", "0"]);
        let marbles = multi_step.iter().find(|q| q.prompt.contains("marbles")).unwrap();
        assert_eq!(marbles.correct_answer, "9");
        let money = multi_step.iter().find(|q| q.prompt.contains("notebooks")).unwrap();
        assert_eq!(money.correct_answer, "₹40");
        assert!(money.options.iter().all(|o| o.starts_with('₹')));
        Ok(())
    }

    #[test]
    fn test_shipped_banks_cover_every_game() -> Result<(), Box<dyn Error>> {
        let banks = QuestionBanks::load(data_path("questions.csv"), data_path("scenarios.csv"))?;

        for game in GAMES.iter().filter(|g| g.id != "conversational") {
            let bank = banks.bank(game.id)?;
            assert!(!bank.is_empty(), "{} has no questions", game.id);
            for question in bank.iter() {
                assert!(
                    question.options.contains(&question.correct_answer),
                    "{}: {} missing from options",
                    game.id,
                    question.correct_answer
                );
            }
        }
        assert_eq!(banks.bank("dot-counting")?.len(), 5);
        assert_eq!(banks.bank("pattern-completion")?.len(), 7);
        assert_eq!(banks.bank("clock-reading")?.len(), 10);
        assert_eq!(banks.scenarios().len(), 2);
        assert!(banks.scenarios().iter().all(|s| s.tiers.is_complete()));
        Ok(())
    }

    #[test]
    fn test_tiered_bank_wraps_around() {
        let mut tiers = TieredBank::default();
        for answer in ["1", "2"] {
            tiers.push(Question {
                prompt: format!("q{}", answer),
                options: Vec::new(),
                correct_answer: answer.to_string(),
                difficulty: Difficulty::Easy,
                follow_up: String::new(),
            });
        }

        assert_eq!(tiers.pick(Difficulty::Easy, 0).unwrap().correct_answer, "1");
        assert_eq!(tiers.pick(Difficulty::Easy, 1).unwrap().correct_answer, "2");
        assert_eq!(tiers.pick(Difficulty::Easy, 2).unwrap().correct_answer, "1");
        assert_eq!(tiers.pick(Difficulty::Easy, 5).unwrap().correct_answer, "2");
        assert!(tiers.pick(Difficulty::Hard, 0).is_none());
    }

    #[test]
    fn test_evaluator_normalizes_free_text() {
        let mut question = create_test_question();
        question.correct_answer = String::from("No");

        assert_eq!(normalize("  NO \n"), "no");
        assert!(evaluate(&question, " no ", MatchRule::IgnoreCase));
        assert!(evaluate(&question, "NO", MatchRule::IgnoreCase));
        assert!(!evaluate(&question, "nope", MatchRule::IgnoreCase));
        assert!(!evaluate(&question, "no", MatchRule::Exact));
        assert!(evaluate(&question, "No", MatchRule::Exact));
    }

    #[test]
    fn test_evaluator_has_no_numeric_tolerance() {
        let mut question = create_test_question();
        question.correct_answer = String::from("10");

        assert!(evaluate(&question, "10", MatchRule::IgnoreCase));
        assert!(!evaluate(&question, "10.0", MatchRule::IgnoreCase));
        assert!(!evaluate(&question, "010", MatchRule::IgnoreCase));
    }

    #[test]
    fn test_difficulty_table() {
        use Difficulty::*;
        let expected = [
            (Medium, true, Hard),
            (Medium, false, Easy),
            (Easy, true, Medium),
            (Easy, false, Easy),
            (Hard, true, Hard),
            (Hard, false, Medium),
        ];
        for (current, correct, next) in expected {
            assert_eq!(next_difficulty(current, correct), next);
            assert_eq!(next_difficulty(current, correct), next_difficulty(current, correct));
        }
    }

    #[test]
    fn test_age_validation() {
        assert_eq!(validate_age("9").unwrap(), 9);
        assert_eq!(validate_age(" 13 ").unwrap(), 13);
        for bad in ["5", "14", "abc", "", "-3"] {
            let err = validate_age(bad).unwrap_err();
            assert!(matches!(err, ScreeningError::InvalidAge(_)));
            assert!(err.user_message().contains("between 6 and 13"));
        }
    }

    #[test]
    fn test_games_are_gated_by_age() {
        let ids = |age| available_games(age).iter().map(|g| g.id).collect::<Vec<_>>();

        assert_eq!(ids(7).len(), 6);
        assert!(!ids(7).contains(&"word-problem"));
        assert!(ids(8).contains(&"word-problem"));
        assert!(!ids(9).contains(&"conversational"));
        assert_eq!(ids(10).len(), GAMES.len());
        assert_eq!(first_game(6).unwrap().id, "dot-counting");
    }

    #[test]
    fn test_too_young_for_named_game() {
        assert_eq!(playable_game("conversational", 10).unwrap().id, "conversational");

        let err = playable_game("conversational", 7).unwrap_err();
        assert!(matches!(err, ScreeningError::AgeRestricted { min_age: 10, .. }));
        assert_eq!(
            err.user_message(),
            "Conversational Math Game is for children aged 10 and up."
        );

        let err = playable_game("no-such-game", 12).unwrap_err();
        assert!(matches!(err, ScreeningError::UnknownGame(_)));
    }

    #[test]
    fn test_failed_photo_download_has_a_reply() {
        let err = ScreeningError::Download("file is too big".to_string());
        assert_eq!(err.user_message(), "Could not read the photo. Please send it again.");
        assert!(err.to_string().contains("file is too big"));
    }

    #[test]
    fn test_passage_tier_follows_age() {
        assert_eq!(AgeTier::for_age(6), AgeTier::Younger);
        assert_eq!(AgeTier::for_age(9), AgeTier::Younger);
        assert_eq!(AgeTier::for_age(10), AgeTier::Older);
        assert_eq!(AgeTier::for_age(13), AgeTier::Older);
    }

    #[test]
    fn test_shipped_passages() -> Result<(), Box<dyn Error>> {
        let passages = PassageBank::load(data_path("passages.csv"))?;
        assert_eq!(passages.len(), 5);
        assert_eq!(passages.era(0).unwrap().name, "Ancient Egypt");
        assert_eq!(passages.era(4).unwrap().name, "Future World");

        let younger = passages.prompt(0, 9).unwrap();
        assert!(younger.passage.starts_with("The pyramids are big and tall."));
        assert_eq!((younger.number, younger.total), (1, 5));
        assert!(!younger.is_last());

        let older = passages.prompt(0, 10).unwrap();
        assert!(older.passage.starts_with("Ancient Egyptians built massive pyramids"));
        assert!(older.passage.len() > younger.passage.len());

        let last = passages.prompt(4, 12).unwrap();
        assert!(last.is_last());
        assert!(passages.prompt(5, 12).is_none());
        Ok(())
    }

    #[test]
    fn test_era_without_both_passages_is_rejected() {
        let csv = "era,tier,passage\n\
                   Wild West,younger,Cowboys rode horses.\n\
                   Wild West,older,Cowboys herded cattle across the plains.\n\
                   Modern City,older,Cities have tall skyscrapers.\n";
        let err = PassageBank::from_reader(csv.as_bytes()).unwrap_err();
        match err {
            ScreeningError::IncompleteBank(msg) => assert!(msg.contains("Modern City"), "{}", msg),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_next_game_follows_order() {
        assert_eq!(next_game("dot-counting", 9), NextStep::Game(find_game("number-comparison").unwrap()));
        assert_eq!(next_game("place-value", 9), NextStep::Game(find_game("word-problem").unwrap()));
        // under 8 the word problems are skipped and place value is last
        assert_eq!(next_game("place-value", 7), NextStep::Reports);
        assert_eq!(next_game("word-problem", 11), NextStep::Game(find_game("conversational").unwrap()));
        assert_eq!(next_game("multi-step", 12), NextStep::Reports);
        assert_eq!(next_game("not-a-game", 12), NextStep::Reports);
    }

    #[test]
    fn test_session_storage_results() -> Result<(), Box<dyn Error>> {
        let mut storage = SessionStorage::default();
        assert!(storage.profile().is_none());

        storage.begin(UserProfile { name: "Asha".to_string(), age: 9 });
        assert_eq!(storage.user_age(), Some(9));

        let result = |score| GameResult {
            game_id: "dot-counting".to_string(),
            game_name: "Dot Counting Game".to_string(),
            score,
            total_questions: 5,
            average_time: 2.5,
            completed: true,
        };
        storage.record_result(result(3));
        storage.record_result(result(5));
        assert_eq!(storage.game_results().len(), 1);
        assert_eq!(storage.game_results()[0].score, 5);

        let json = storage.game_results_json()?;
        assert!(json.contains("\"gameId\":\"dot-counting\""));
        assert!(json.contains("\"totalQuestions\":5"));

        let mut restored = SessionStorage::default();
        restored.restore_game_results(&json)?;
        assert_eq!(restored.game_results(), storage.game_results());

        storage.begin(UserProfile { name: "Ravi".to_string(), age: 11 });
        assert!(storage.game_results().is_empty());
        assert_eq!(storage.profile().unwrap().name, "Ravi");
        Ok(())
    }

    #[test]
    fn test_config_from_vars() {
        let mut vars = HashMap::new();
        vars.insert("SCREENING_API_URL", "https://screening.example.org/");
        vars.insert("SCREENING_API_TIMEOUT_SECS", "12");
        vars.insert("UNRELATED_TICK_SECS", "0");
        let config = AppConfig::from_vars(vars).unwrap();

        assert_eq!(config.api_base_url, "https://screening.example.org/");
        assert_eq!(config.request_timeout, Duration::from_secs(12));
        assert_eq!(config.tick_interval, Duration::from_secs(5));
        assert_eq!(config.questions_path, PathBuf::from("data/questions.csv"));
        assert_eq!(config.passages_path, PathBuf::from("data/passages.csv"));
    }

    #[test]
    fn test_config_defaults_without_vars() {
        let config = AppConfig::from_vars(Vec::<(String, String)>::new()).unwrap();
        let defaults = AppConfig::default();

        assert_eq!(config.api_base_url, defaults.api_base_url);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.scenarios_path, defaults.scenarios_path);
    }

    #[test]
    fn test_config_rejects_bad_numbers() {
        let err = AppConfig::from_vars([("SCREENING_API_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert!(matches!(err, ScreeningError::Config(_)));

        let err = AppConfig::from_vars([("SCREENING_TICK_SECS", "0")]).unwrap_err();
        assert!(matches!(err, ScreeningError::Config(_)));
    }

    #[test]
    fn test_average_time_of_nothing_is_zero() {
        assert_eq!(average_time(&[]), 0.0);
    }
}
