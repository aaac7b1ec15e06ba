use error_stack::Report;

use crate::KernelError;

pub(crate) fn validate_length(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> error_stack::Result<(), KernelError> {
    let length = value.chars().count();
    if length < min {
        return Err(Report::new(KernelError::InvalidInput).attach_printable(format!(
            "{field} is too short (minimum is {min} characters)"
        )));
    }
    if length > max {
        return Err(Report::new(KernelError::InvalidInput).attach_printable(format!(
            "{field} is too long (maximum is {max} characters)"
        )));
    }
    Ok(())
}
