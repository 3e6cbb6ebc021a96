mod test_demo_inputs;
mod test_report_output;
