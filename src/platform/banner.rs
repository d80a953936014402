use crate::platform::parameters::gui;

#[derive(Default, Debug)]
pub struct Banner {
    pub message: String,
}

impl Banner {
    pub fn new() -> Banner {
        Banner {
            message: String::new(),
        }
    }

    pub fn format(&mut self) {
        self.message = format!("\n**** Welcome to {}, Version {}", gui::APPLICATION_NAME, gui::VERSION);
        self.message += &format!("\n**** Today is {}", chrono::Local::now().format("%m-%d-%Y %H:%M:%S"));

        self.message += "\n\nDEPENDENCIES";
        self.message += &format!("\negui             : {}", env!("EGUI_VERSION"));
        self.message += &format!("\nbevy_ecs         : {}", env!("BEVY_ECS_VERSION"));
        self.message += &format!("\nnalgebra         : {}\n", env!("NALGEBRA_VERSION"));
    }

    pub fn log(&self) {
        for line in self.message.lines().filter(|line| !line.is_empty()) {
            log::info!("{}", line);
        }
    }
}
