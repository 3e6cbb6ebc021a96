mod test_demo_inputs {
    use crate::input::PolicyOverrides;
    use crate::output::MemoryOutput;
    use crate::{run_project, ProjectFlags, SizingOutcome};
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::ffi::OsStr;
    use std::fs::File;
    use std::io::BufReader;
    use std::path::{Path, PathBuf};
    use walkdir::WalkDir;

    fn demo_files() -> Vec<PathBuf> {
        WalkDir::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("demos"))
            .into_iter()
            .filter_map(Result::ok)
            .map(|entry| entry.into_path())
            .filter(|path| path.extension() == Some(OsStr::new("json")))
            .collect()
    }

    fn demo_file(name: &str) -> BufReader<File> {
        BufReader::new(
            File::open(Path::new(env!("CARGO_MANIFEST_DIR")).join("demos").join(name)).unwrap(),
        )
    }

    #[rstest]
    fn test_all_demo_inputs_run() {
        let files = demo_files();
        assert!(!files.is_empty());

        for path in files {
            let output = MemoryOutput::new();
            let result = run_project(
                BufReader::new(File::open(&path).unwrap()),
                &output,
                &PolicyOverrides::default(),
                &ProjectFlags::all(),
            );

            assert!(result.is_ok(), "demo {path:?} failed: {result:?}");
            assert_eq!(
                output.file_names(),
                vec!["loads.csv", "summary.csv", "report.json"]
            );
        }
    }

    #[rstest]
    #[case("single_motor.json", Some(112.5))]
    #[case("mixed_facility.json", Some(112.5))]
    #[case("industrial_plant.json", Some(2000.))]
    #[case("all_standby.json", None)]
    fn test_demo_selections(#[case] file_name: &str, #[case] expected_capacity_kva: Option<f64>) {
        let report = run_project(
            demo_file(file_name),
            MemoryOutput::new(),
            &PolicyOverrides::default(),
            &ProjectFlags::empty(),
        )
        .unwrap();

        assert_eq!(
            report
                .sizing
                .selected()
                .map(|sizing| sizing.selected_capacity_kva),
            expected_capacity_kva
        );
        if expected_capacity_kva.is_none() {
            assert_eq!(report.sizing, SizingOutcome::NoLoad);
        }
    }
}
