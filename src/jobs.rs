use crate::config::Settings;
use relay::{JobInput, JobSpec};

/// File contract of one script-backed endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayEndpoint {
    /// Job name, prefix of the job directory
    pub name: &'static str,
    pub script: &'static str,
    pub input_file: &'static str,
    pub output_file: &'static str,
}

pub const CHATBOT: RelayEndpoint = RelayEndpoint {
    name: "chatbot",
    script: "chatbot.py",
    input_file: "prompt.txt",
    output_file: "answer_prompt.txt",
};

pub const GENERATE_PORTFOLIO: RelayEndpoint = RelayEndpoint {
    name: "generate-portfolio",
    script: "generatePortfolio.py",
    input_file: "portfolio_prompt.txt",
    output_file: "generated_portfolio.json",
};

pub const HISTOGRAM: RelayEndpoint = RelayEndpoint {
    name: "histogram",
    script: "generate_graphs.py",
    input_file: "result.json",
    output_file: "sector_histogram.png",
};

pub const PREDICTION: RelayEndpoint = RelayEndpoint {
    name: "predict",
    script: "predicter.py",
    input_file: "portfolio.json",
    output_file: "result.json",
};

pub const ALL: [RelayEndpoint; 4] = [CHATBOT, GENERATE_PORTFOLIO, HISTOGRAM, PREDICTION];

impl RelayEndpoint {
    /// Job for this endpoint, without input.
    pub fn job(&self, settings: &Settings) -> JobSpec {
        JobSpec::new(self.name, settings.script_path(self.script), self.output_file)
    }

    /// Job for this endpoint with `contents` as its input file.
    pub fn job_with_input(&self, settings: &Settings, contents: impl Into<Vec<u8>>) -> JobSpec {
        self.job(settings)
            .with_input(JobInput::new(self.input_file, contents))
    }

    pub fn script_exists(&self, settings: &Settings) -> bool {
        settings.script_path(self.script).is_file()
    }
}
