//! `env()` — prints a report of every global currently defined, name and
//! stringified value, sorted for deterministic output.

use crate::environment::Environment;
use crate::heap::Heap;
use crate::intern::Interns;
use crate::io::PrintWriter;

pub fn call(print: &mut impl PrintWriter, globals: &Environment, heap: &Heap, interns: &Interns) {
    let mut entries: Vec<(String, String)> = globals
        .global_entries()
        .map(|(name, value)| (interns.get(name).to_owned(), value.stringify(heap, interns)))
        .collect();
    entries.sort();

    print.print_line(&format!("env: {} global(s) defined", entries.len()));
    for (name, value) in entries {
        print.print_line(&format!("  {name} = {value}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environments;
    use crate::io::CollectStringPrint;
    use crate::value::Value;

    #[test]
    fn reports_every_defined_global_by_name_and_value() {
        let mut envs = Environments::new();
        let mut interns = Interns::new();
        let heap = Heap::new();
        let a = interns.intern("a");
        let b = interns.intern("b");
        envs.get_mut(crate::environment::GLOBAL_ENV_ID).define_global(a, Value::Number(1.0));
        envs.get_mut(crate::environment::GLOBAL_ENV_ID).define_global(b, Value::Boolean(true));

        let mut print = CollectStringPrint::new();
        call(&mut print, envs.get(crate::environment::GLOBAL_ENV_ID), &heap, &interns);

        assert_eq!(print.into_string(), "env: 2 global(s) defined\n  a = 1\n  b = true\n");
    }
}
