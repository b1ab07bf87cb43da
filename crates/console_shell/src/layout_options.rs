//! Tree-layout options shown by the demo shell.

use tree_console::{
    ChangeOutcome, ControlState, ControlStatus, ControlValue, DescriptorError,
    ParameterDescriptorCompiler, SessionContext, ValueMap,
};

const SHAPES: [&str; 3] = ["Rectangular", "Radial", "Circular"];

/// Width and height applied by each entry of the `Presets` buttons.
const PRESETS: [(f64, f64); 2] = [(400.0, 300.0), (1600.0, 1200.0)];

pub fn descriptors() -> Vec<(&'static str, String)> {
    let shapes = SHAPES
        .iter()
        .map(|shape| format!("\"{shape}\""))
        .collect::<Vec<_>>()
        .join(",");
    vec![
        ("Trees", "TreeCollection:".to_string()),
        ("Window", "Window:".to_string()),
        ("State", "InstanceStateData:".to_string()),
        ("Shape", format!("ComboBox:0[{shapes}]")),
        ("Dimensions", "Group:3".to_string()),
        ("Width", "NumericUpDown:800[100,4000,10]".to_string()),
        ("Height", "NumericUpDown:600[100,4000,10]".to_string()),
        ("Radius", "NumericUpDown:300[50,2000,10]".to_string()),
        ("Branches", "Group:3".to_string()),
        ("Colour", "Colour:[40,40,40]".to_string()),
        ("Thickness", "Slider:1[0.5,10,0.5,\"0.0\"]".to_string()),
        ("Style", "Dash:[1,0]".to_string()),
        ("TipLabels", "CheckBox:true".to_string()),
        ("Font", "Font:[\"Helvetica\",12]".to_string()),
        ("Presets", "Buttons:[\"Compact\",\"Spacious\"]".to_string()),
        (
            "Note",
            "Label:[\"Values apply immediately\",\"Center\"]".to_string(),
        ),
    ]
}

/// Dependent controls: the shape picks which dimensions apply, tip labels gate the font, and
/// presets set the rectangular size.
pub fn on_change(old: &ValueMap, new: &ValueMap) -> ChangeOutcome {
    let mut outcome = ChangeOutcome::new();

    let rectangular = new.get("Shape").and_then(ControlValue::as_choice) == Some(0);
    let (flat, round) = if rectangular {
        (ControlStatus::Enabled, ControlStatus::Hidden)
    } else {
        (ControlStatus::Hidden, ControlStatus::Enabled)
    };
    outcome.set_status("Width", flat);
    outcome.set_status("Height", flat);
    outcome.set_status("Radius", round);

    let labels = new.get("TipLabels").and_then(ControlValue::as_bool) != Some(false);
    outcome.set_status(
        "Font",
        if labels {
            ControlStatus::Enabled
        } else {
            ControlStatus::Disabled
        },
    );

    let pressed = new.get("Presets").and_then(ControlValue::pressed);
    if let Some(&(width, height)) = pressed.and_then(|index| PRESETS.get(index)) {
        if old.get("Presets").and_then(ControlValue::pressed) != pressed {
            outcome.push_override("Shape", ControlValue::Choice(0));
        }
        outcome.push_override("Width", ControlValue::Number(width));
        outcome.push_override("Height", ControlValue::Number(height));
    }
    outcome
}

pub fn compile(session: &SessionContext) -> Result<ControlState, DescriptorError> {
    ParameterDescriptorCompiler::new(session).compile(descriptors(), on_change)
}
