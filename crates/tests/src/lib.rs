#[cfg(test)]
mod testing_tool;
#[cfg(test)]
mod tests;
