mod test_report_output {
    use crate::errors::{CalculationError, TrafoError};
    use crate::input::{CoolingType, PolicyOverrides};
    use crate::output::{MemoryOutput, SinkOutput};
    use crate::{format_load_table, run_project, ProjectFlags};
    use pretty_assertions::assert_eq;
    use rstest::*;
    use serde_json::{json, Value};

    #[fixture]
    fn single_motor_input() -> String {
        json!({
            "SizingPolicy": {
                "diversification_factor": 0.75,
                "reserve_margin": 0.2,
                "cooling_type": "dry"
            },
            "Loads": [
                {
                    "id": "M-1",
                    "label": "Chiller pump",
                    "voltage": 480.,
                    "phase_system": "three_phase",
                    "load_type": "motor",
                    "usage_pattern": "continuous",
                    "power_unit": "hp",
                    "power_value": 100.,
                    "has_variable_frequency_drive": false
                }
            ]
        })
        .to_string()
    }

    #[rstest]
    fn test_load_table_csv(single_motor_input: String) {
        let output = MemoryOutput::new();

        run_project(
            single_motor_input.as_bytes(),
            &output,
            &PolicyOverrides::default(),
            &ProjectFlags::DETAILED_LOAD_OUTPUT,
        )
        .unwrap();

        assert_eq!(output.file_names(), vec!["loads.csv", "summary.csv"]);
        let loads = output.contents("loads.csv").unwrap();
        assert_eq!(
            loads.lines().collect::<Vec<_>>(),
            vec![
                "No,Id,Load,Type,Usage,PF,Efficiency,P,Q,S",
                "[count],,,,,[ratio],[ratio],[kW],[kVAR],[kVA]",
                "1,M-1,Chiller pump,motor,continuous,0.88,0.95,78.53,42.38,89.23",
                "Total,,,,,0.88,,78.53,42.38,89.23",
            ]
        );
    }

    #[rstest]
    fn test_summary_csv(single_motor_input: String) {
        let output = MemoryOutput::new();

        run_project(
            single_motor_input.as_bytes(),
            &output,
            &PolicyOverrides::default(),
            &ProjectFlags::empty(),
        )
        .unwrap();

        assert_eq!(output.file_names(), vec!["summary.csv"]);
        let summary = output.contents("summary.csv").unwrap();
        let lines = summary.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "Quantity,Value,Unit");
        assert!(lines.contains(&"Total apparent power,89.23,[kVA]"));
        assert!(lines.contains(&"Cooling type,dry,"));
        assert!(lines.contains(&"Status,selected,"));
        assert!(lines.contains(&"Selected transformer,112.5,[kVA]"));
        assert!(lines.contains(&"Efficiency,98.74%,[%]"));
        assert!(lines.contains(&"Reserve margin,20.00%,[%]"));
    }

    #[rstest]
    fn test_policy_overrides_reach_the_selection(single_motor_input: String) {
        let report = run_project(
            single_motor_input.as_bytes(),
            SinkOutput,
            &PolicyOverrides {
                cooling_type: Some(CoolingType::OilImmersed),
                ..Default::default()
            },
            &ProjectFlags::empty(),
        )
        .unwrap();

        let sizing = report.sizing.selected().unwrap();
        assert_eq!(sizing.efficiency, 0.9911);
        assert_eq!(report.sizing_policy.cooling_type, CoolingType::OilImmersed);
    }

    #[rstest]
    fn test_json_report(single_motor_input: String) {
        let output = MemoryOutput::new();

        run_project(
            single_motor_input.as_bytes(),
            &output,
            &PolicyOverrides::default(),
            &ProjectFlags::JSON_REPORT,
        )
        .unwrap();

        let report: Value = serde_json::from_str(&output.contents("report.json").unwrap()).unwrap();
        assert_eq!(report["sizing"]["status"], json!("selected"));
        assert_eq!(report["sizing"]["selected_capacity_kva"], json!(112.5));
        assert_eq!(report["loads"][0]["id"], json!("M-1"));
        assert_eq!(report["loads"][0]["load_type"], json!("motor"));
        assert_eq!(report["sizing_policy"]["cooling_type"], json!("dry"));
    }

    #[rstest]
    fn test_no_load_summary() {
        let input = json!({
            "SizingPolicy": {
                "diversification_factor": 1.0,
                "reserve_margin": 0.0,
                "cooling_type": "oil_immersed"
            },
            "Loads": [
                {
                    "id": "GEN-AUX",
                    "label": "Standby pump",
                    "load_type": "motor",
                    "usage_pattern": "stand_by",
                    "power_unit": "kW",
                    "power_value": 15.,
                    "has_variable_frequency_drive": true
                }
            ]
        })
        .to_string();
        let output = MemoryOutput::new();

        run_project(
            input.as_bytes(),
            &output,
            &PolicyOverrides::default(),
            &ProjectFlags::JSON_REPORT,
        )
        .unwrap();

        let summary = output.contents("summary.csv").unwrap();
        assert!(summary.lines().any(|line| line == "Status,no load,"));
        assert!(!summary.contains("Selected transformer"));
        let report: Value = serde_json::from_str(&output.contents("report.json").unwrap()).unwrap();
        assert_eq!(report["sizing"], json!({"status": "no_load"}));
    }

    #[rstest]
    fn test_malformed_input_is_an_invalid_request() {
        let result = run_project(
            "{\"Loads\": []".as_bytes(),
            SinkOutput,
            &PolicyOverrides::default(),
            &ProjectFlags::empty(),
        );

        assert!(matches!(result, Err(TrafoError::InvalidRequest(_))));
    }

    #[rstest]
    fn test_invalid_override_is_an_invalid_request(single_motor_input: String) {
        let result = run_project(
            single_motor_input.as_bytes(),
            SinkOutput,
            &PolicyOverrides {
                reserve_margin: Some(-0.5),
                ..Default::default()
            },
            &ProjectFlags::empty(),
        );

        assert!(matches!(result, Err(TrafoError::InvalidRequest(_))));
    }

    #[rstest]
    fn test_unrecognised_unit_fails_calculation_and_writes_nothing(single_motor_input: String) {
        let input = single_motor_input.replace("\"hp\"", "\"MW\"");
        let output = MemoryOutput::new();

        let result = run_project(
            input.as_bytes(),
            &output,
            &PolicyOverrides::default(),
            &ProjectFlags::all(),
        );

        match result {
            Err(TrafoError::FailureInCalculation(CalculationError::InvalidInput(error))) => {
                assert_eq!(
                    error.to_string(),
                    "Load 'M-1' has an unrecognised power_unit: 'MW'"
                );
            }
            other => panic!("unexpected result {other:?}"),
        }
        assert!(output.file_names().is_empty());
    }

    #[rstest]
    fn test_format_load_table(single_motor_input: String) {
        let report = run_project(
            single_motor_input.as_bytes(),
            SinkOutput,
            &PolicyOverrides::default(),
            &ProjectFlags::empty(),
        )
        .unwrap();

        let table = format_load_table(&report);
        let lines = table.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("M-1"));
        assert!(lines[1].ends_with("78.53      42.38      89.23"));
    }
}
